//! cardkit: the state and animation core of the interactive skill card.
//!
//! - `catalog`: the immutable, ordered list of card variants.
//! - `cache`: texture memoization with at most one load per resource id.
//! - `visual`: the derived, memoized draw attributes for `(item, hovered)`.
//! - `interaction`: hover/click state machine over raw host events.
//! - `animation`: idle wobble and pointer tracking, driven by wall-clock time.
//! - `compose`: the six primitives of a frame, plus the group hit region.
//! - `viewer`: a facade owning one catalog and its viewer state.
//!
//! Nothing in here touches a GPU or a window; hosts feed events in and draw
//! the composed [`compose::Frame`] however they like.

pub mod animation;
pub mod cache;
pub mod catalog;
pub mod color;
pub mod compose;
pub mod error;
pub mod hit;
pub mod interaction;
pub mod state;
pub mod viewer;
pub mod visual;

pub use animation::{AnimationParams, FrameClock, Orientation};
pub use cache::{LoadMode, ResourceCache, ResourceLoader, TextureData};
pub use catalog::{Catalog, Item, Level, ResourceId};
pub use color::Rgba;
pub use compose::{Frame, Primitive};
pub use error::{LoadError, ResourceLoadFailure, ViewerError};
pub use interaction::{HostEvent, Interaction, Pointer, Viewport};
pub use state::{Selection, ViewerState};
pub use viewer::CardViewer;
pub use visual::VisualAttrs;
