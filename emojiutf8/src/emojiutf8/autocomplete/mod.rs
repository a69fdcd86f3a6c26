//! Trigger-driven completion for plain text surfaces.
//!
//! A [`Completer`] owns a list of strategies and a [`Dropdown`]. Each change to
//! the surface goes through [`Completer::trigger`], which hands back a detached
//! [`Lookup`] when a strategy pattern matches. The host awaits it wherever it
//! likes and feeds the result into [`Completer::apply`]. Every lookup carries a
//! generation number; results from anything but the latest lookup are dropped,
//! so a slow search can never overwrite a fresher one.

pub mod adapter;
pub mod dropdown;
pub mod emoji;
pub mod strategy;

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

pub use self::adapter::{Adapter, Textarea};
pub use self::dropdown::{Dropdown, DropdownOptions};
pub use self::emoji::EmojiStrategy;
pub use self::strategy::{Strategy, StrategyHandle, StrategyOptions};

/// Where a strategy matched and what it is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInfo {
    pub strategy: usize,
    /// Byte range of the whole match in the surface value.
    pub span: Range<usize>,
    pub groups: Vec<Option<String>>,
    pub term: String,
    /// Generation of the lookup spawned for this match.
    pub generation: u64,
}

impl MatchInfo {
    pub fn group(&self, index: usize) -> &str {
        self.groups
            .get(index)
            .and_then(|group| group.as_deref())
            .unwrap_or("")
    }

    pub fn matched(&self) -> &str {
        self.group(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// Matched, waiting out the debounce window.
    Matching,
    LookingUp,
    ShowingDropdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Enter,
    Escape,
}

/// What the host should do with the key that produced a [`Command`].
pub enum Reaction<C> {
    /// Not ours; let the key through.
    Ignored,
    Consumed,
    /// Consumed, and the surface changed enough to start another lookup.
    Lookup(Lookup<C>),
}

pub enum Outcome<C> {
    Ready(Vec<C>),
    Failed(anyhow::Error),
    Superseded,
}

pub struct LookupResult<C> {
    pub generation: u64,
    pub outcome: Outcome<C>,
}

/// A pending search, detached from the completer that issued it.
pub struct Lookup<C> {
    generation: u64,
    latest: Arc<AtomicU64>,
    handle: Arc<StrategyHandle<C>>,
    term: String,
}

impl<C: Clone + Send + 'static> Lookup<C> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    pub async fn run(self) -> LookupResult<C> {
        if let Some(window) = self.handle.options().debounce {
            tokio::time::sleep(window).await;
        }

        if !self.is_current() {
            return LookupResult {
                generation: self.generation,
                outcome: Outcome::Superseded,
            };
        }

        let outcome = match self.handle.find_matches(&self.term).await {
            Ok(mut found) => {
                found.truncate(self.handle.options().max_count);
                Outcome::Ready(found)
            }
            Err(e) => Outcome::Failed(e),
        };

        LookupResult {
            generation: self.generation,
            outcome,
        }
    }
}

pub struct Completer<C> {
    strategies: Vec<Arc<StrategyHandle<C>>>,
    dropdown: Dropdown<C>,
    state: State,
    match_info: Option<MatchInfo>,
    generation: Arc<AtomicU64>,
}

impl<C: Clone + Send + 'static> Completer<C> {
    pub fn new(options: DropdownOptions) -> Self {
        Self {
            strategies: vec![],
            dropdown: Dropdown::new(options),
            state: State::Idle,
            match_info: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn register(&mut self, strategy: Box<dyn Strategy<C>>, options: StrategyOptions) {
        self.strategies
            .push(Arc::new(StrategyHandle::new(strategy, options)));
    }

    pub fn strategies(&self) -> &[Arc<StrategyHandle<C>>] {
        &self.strategies
    }

    /// Re-evaluate the strategies after the surface changed.
    pub fn trigger(&mut self, surface: &impl Adapter) -> Option<Lookup<C>> {
        match surface.match_info(&self.strategies) {
            Some(info) => Some(self.lookup(info)),
            None => {
                self.cancel();
                None
            }
        }
    }

    pub fn lookup(&mut self, mut info: MatchInfo) -> Lookup<C> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = Arc::clone(&self.strategies[info.strategy]);

        self.state = if handle.options().debounce.is_some() {
            State::Matching
        } else {
            State::LookingUp
        };
        // Results for the previous term must not stay selectable.
        self.dropdown.deactivate();
        info.generation = generation;
        let term = info.term.clone();
        self.match_info = Some(info);

        Lookup {
            generation,
            latest: Arc::clone(&self.generation),
            handle,
            term,
        }
    }

    /// Show a finished lookup. Returns whether the dropdown now holds its results.
    pub fn apply(&mut self, result: LookupResult<C>) -> bool {
        if result.generation != self.generation.load(Ordering::SeqCst) {
            debug!("Discarding stale lookup #{}", result.generation);
            return false;
        }

        let found = match result.outcome {
            Outcome::Ready(found) => found,
            Outcome::Superseded => return false,
            Outcome::Failed(e) => {
                warn!("Lookup #{} failed: {e:#}", result.generation);
                self.close();
                return false;
            }
        };

        let Some(info) = self.match_info.as_ref() else {
            return false;
        };
        if found.is_empty() {
            self.close();
            return false;
        }

        let handle = Arc::clone(&self.strategies[info.strategy]);
        self.dropdown
            .render(found, |candidate| handle.strategy().template(candidate));
        self.state = State::ShowingDropdown;
        true
    }

    /// Show rendered results when the dropdown does not auto-show.
    pub fn show(&mut self) {
        if self.state == State::ShowingDropdown && !self.dropdown.items().is_empty() {
            self.dropdown.activate();
        }
    }

    pub fn command(&mut self, command: Command, surface: &mut impl Adapter) -> Reaction<C> {
        match command {
            Command::Escape => {
                if self.state == State::Idle {
                    return Reaction::Ignored;
                }
                self.cancel();
                Reaction::Consumed
            }
            _ if self.state != State::ShowingDropdown || !self.dropdown.is_shown() => {
                Reaction::Ignored
            }
            Command::Up => {
                self.dropdown.up();
                Reaction::Consumed
            }
            Command::Down => {
                self.dropdown.down();
                Reaction::Consumed
            }
            Command::Enter => {
                if self.dropdown.active().is_none() {
                    return Reaction::Ignored;
                }
                match self.select_active(surface) {
                    Some(lookup) => Reaction::Lookup(lookup),
                    None => Reaction::Consumed,
                }
            }
        }
    }

    pub fn click(&mut self, index: usize, surface: &mut impl Adapter) -> Option<Lookup<C>> {
        if !self.dropdown.select_index(index) {
            return None;
        }
        self.select_active(surface)
    }

    /// Splice the active candidate into the surface, then look for a new trigger.
    pub fn select_active(&mut self, surface: &mut impl Adapter) -> Option<Lookup<C>> {
        let info = self.match_info.clone()?;
        let candidate = self.dropdown.active()?.clone();
        let handle = Arc::clone(&self.strategies[info.strategy]);
        let replacement = handle.strategy().replace(&info, &candidate);

        self.close();
        if surface.replace_text(&info, &replacement).is_none() {
            debug!("Surface changed under match {:?}, skipping replace", info.span);
        }
        self.trigger(&*surface)
    }

    /// Drop the current match and every lookup still in flight.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.close();
    }

    fn close(&mut self) {
        self.dropdown.deactivate();
        self.match_info = None;
        self.state = State::Idle;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn match_info(&self) -> Option<&MatchInfo> {
        self.match_info.as_ref()
    }

    pub fn dropdown(&self) -> &Dropdown<C> {
        &self.dropdown
    }

    pub fn dropdown_mut(&mut self) -> &mut Dropdown<C> {
        &mut self.dropdown
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
