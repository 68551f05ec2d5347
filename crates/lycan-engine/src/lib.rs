//! The Werewolf game engine for a single room.
//!
//! A [`Game`] is a synchronous state machine: players register, the host
//! configures and deals roles, and from then on the game moves through
//! night, day, and voting phases each time every living player has
//! confirmed the current one. Night actions are buffered and resolved
//! together in a fixed order; day actions and revenge shots apply
//! immediately.
//!
//! The engine knows nothing about sockets or other rooms. Its owner must
//! serialise calls (see `lycan-room` for the actor that does this) and
//! route the [`PrivateNotice`]s in each [`Outcome`] to their recipient
//! only.
//!
//! # Key types
//!
//! - [`Game`]: one room's state and every operation on it
//! - [`Role`] / [`RoleDefinition`]: the fixed role catalog
//! - [`Phase`]: where the game currently is
//! - [`Outcome`]: what a mutating call changed
//! - [`Snapshot`]: the per-viewer public state

mod action;
mod day;
mod error;
mod game;
mod log;
mod night;
mod outcome;
mod phase;
mod player;
mod revenge;
mod role;
mod view;
mod vote;
pub mod win;

pub use action::{DayActionKind, NightAction, NightActionKind, Potion};
pub use error::{EngineError, ErrorKind};
pub use game::{Game, GameConfig};
pub use log::{GameLog, LogEntry};
pub use outcome::{Notice, Outcome, PrivateNotice};
pub use phase::{Barrier, Phase, PendingRevenge, RevengeCause};
pub use player::{Player, Potions, Registry};
pub use role::{Ability, Role, RoleCount, RoleDefinition, Team};
pub use view::{PlayerView, RevengeView, RoleReveal, Snapshot, Teammate, WolfChat};
pub use vote::{Tally, tally};
pub use win::Winner;
