#[derive(Debug, Clone)]
pub struct DropdownOptions {
    /// Show as soon as a non-empty result set is rendered.
    pub auto_show: bool,
    /// Rows visible at once; `0` disables scrolling.
    pub visible_rows: usize,
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Default for DropdownOptions {
    fn default() -> Self {
        Self {
            auto_show: true,
            visible_rows: 10,
            header: None,
            footer: None,
        }
    }
}

type HoverFn<C> = Box<dyn FnMut(&C) + Send>;

/// Candidate list state behind the completion popup.
pub struct Dropdown<C> {
    options: DropdownOptions,
    items: Vec<C>,
    rendered: Vec<String>,
    shown: bool,
    selected: Option<usize>,
    scroll_top: usize,
    on_hover: Option<HoverFn<C>>,
}

impl<C> Dropdown<C> {
    pub fn new(options: DropdownOptions) -> Self {
        Self {
            options,
            items: vec![],
            rendered: vec![],
            shown: false,
            selected: None,
            scroll_top: 0,
            on_hover: None,
        }
    }

    pub fn set_on_hover(&mut self, on_hover: impl FnMut(&C) + Send + 'static) {
        self.on_hover = Some(Box::new(on_hover));
    }

    pub fn render(&mut self, items: Vec<C>, template: impl Fn(&C) -> String) {
        self.deactivate();
        self.rendered = items.iter().map(template).collect();
        self.items = items;
        if self.options.auto_show && !self.items.is_empty() {
            self.activate();
        }
    }

    pub fn activate(&mut self) {
        self.shown = true;
    }

    pub fn deactivate(&mut self) {
        self.items.clear();
        self.rendered.clear();
        self.shown = false;
        self.selected = None;
        self.scroll_top = 0;
    }

    pub fn up(&mut self) {
        self.move_by(-1);
    }

    pub fn down(&mut self) {
        self.move_by(1);
    }

    /// Point the selection at `index` directly, as a click would.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn active(&self) -> Option<&C> {
        if !self.shown {
            return None;
        }
        self.selected.and_then(|index| self.items.get(index))
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn items(&self) -> &[C] {
        &self.items
    }

    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Rendered rows currently scrolled into view.
    pub fn visible(&self) -> &[String] {
        if self.options.visible_rows == 0 {
            return &self.rendered;
        }
        let end = (self.scroll_top + self.options.visible_rows).min(self.rendered.len());
        &self.rendered[self.scroll_top.min(end)..end]
    }

    pub fn header(&self) -> Option<&str> {
        self.options.header.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.options.footer.as_deref()
    }

    fn move_by(&mut self, delta: isize) {
        if !self.shown || self.items.is_empty() {
            return;
        }

        let len = self.items.len() as isize;
        let next = match self.selected {
            Some(index) => (index as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        self.selected = Some(next);

        if let Some(on_hover) = self.on_hover.as_mut() {
            on_hover(&self.items[next]);
        }
        self.scroll_into_view(next);
    }

    fn scroll_into_view(&mut self, index: usize) {
        let rows = self.options.visible_rows;
        if rows == 0 {
            return;
        }
        if index < self.scroll_top {
            self.scroll_top = index;
        } else if index >= self.scroll_top + rows {
            self.scroll_top = index + 1 - rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn dropdown(rows: usize) -> Dropdown<&'static str> {
        let mut dropdown = Dropdown::new(DropdownOptions {
            visible_rows: rows,
            ..DropdownOptions::default()
        });
        dropdown.render(vec!["a", "b", "c"], |item| format!("<li>{item}</li>"));
        dropdown
    }

    #[test]
    fn render_applies_template_and_auto_shows() {
        let dropdown = dropdown(10);
        assert!(dropdown.is_shown());
        assert_eq!(dropdown.rendered()[1], "<li>b</li>");
        assert_eq!(dropdown.selected(), None);
        assert_eq!(dropdown.active(), None);
    }

    #[test]
    fn empty_results_stay_hidden() {
        let mut dropdown: Dropdown<&str> = Dropdown::new(DropdownOptions::default());
        dropdown.render(vec![], |item| item.to_string());
        assert!(!dropdown.is_shown());
        dropdown.down();
        assert_eq!(dropdown.selected(), None);
    }

    #[test]
    fn navigation_wraps_around() {
        let mut dropdown = dropdown(10);
        dropdown.up();
        assert_eq!(dropdown.selected(), Some(0));
        dropdown.up();
        assert_eq!(dropdown.selected(), Some(2));
        dropdown.down();
        assert_eq!(dropdown.selected(), Some(0));
        assert_eq!(dropdown.active(), Some(&"a"));
    }

    #[test]
    fn hover_callback_sees_each_move() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut dropdown = dropdown(10);
        let sink = Arc::clone(&seen);
        dropdown.set_on_hover(move |item| sink.lock().unwrap().push(*item));

        dropdown.down();
        dropdown.down();
        dropdown.up();
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "a"]);
    }

    #[test]
    fn selection_scrolls_into_view() {
        let mut dropdown = dropdown(2);
        assert_eq!(dropdown.visible(), ["<li>a</li>", "<li>b</li>"]);

        dropdown.down();
        dropdown.down();
        dropdown.down();
        assert_eq!(dropdown.selected(), Some(2));
        assert_eq!(dropdown.scroll_top(), 1);
        assert_eq!(dropdown.visible(), ["<li>b</li>", "<li>c</li>"]);

        dropdown.down();
        assert_eq!(dropdown.selected(), Some(0));
        assert_eq!(dropdown.scroll_top(), 0);
    }

    #[test]
    fn deactivate_resets_everything() {
        let mut dropdown = dropdown(2);
        dropdown.down();
        dropdown.deactivate();
        assert!(!dropdown.is_shown());
        assert!(dropdown.items().is_empty());
        assert_eq!(dropdown.selected(), None);
        assert!(!dropdown.select_index(0));
    }
}
