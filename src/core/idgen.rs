//! Fresh identifiers for copied sessions and their bubbles.
//!
//! Bubble keys share one namespace across the whole installation, so new
//! ids must be statistically unique globally, not merely within one store.
//! UUID v4 (OS-backed CSPRNG) gives that; anything weaker risks silent
//! bubble collisions in the global store.

use uuid::Uuid;

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_bubble_id() -> String {
    Uuid::new_v4().to_string()
}
