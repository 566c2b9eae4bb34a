//! Shared mask stage
//!
//! Everything animation callbacks touch lives here behind an
//! `Rc<RefCell<..>>`: the surface slot, the brush sprite and the falling
//! drops. Callbacks check the surface slot first and do nothing once it has
//! been released.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use veil_animation::TweenProps;

new_key_type! {
    /// Identifier of a falling drop
    pub struct DropId;
}

/// Surface plus the sprites animated over it
#[derive(Debug)]
pub struct Stage<S> {
    pub surface: Option<S>,
    /// Whether pointer input is being accepted
    pub listening: bool,
    /// Brush sprite position and rotation
    pub brush: TweenProps,
    pub drops: SlotMap<DropId, TweenProps>,
    /// Drops spawned since the last teardown
    pub drops_spawned: u32,
    /// Set by a completed clear; the controller finishes the stop on its next tick
    pub torn_down: bool,
}

impl<S> Stage<S> {
    pub fn new() -> Self {
        Self {
            surface: None,
            listening: false,
            brush: TweenProps::default(),
            drops: SlotMap::with_key(),
            drops_spawned: 0,
            torn_down: false,
        }
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Release the surface and every sprite, resetting the drop counter
    pub fn release(&mut self) {
        self.surface = None;
        self.listening = false;
        self.drops.clear();
        self.drops_spawned = 0;
    }
}

impl<S> Default for Stage<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stage handle shared between the controller and its animations
pub type SharedStage<S> = Rc<RefCell<Stage<S>>>;
