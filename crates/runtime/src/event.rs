//! Input events a host forwards to the controller.
//!
//! Coordinates are surface-local CSS pixels. Handling an event only mutates
//! controller state; nothing is drawn until the next frame.

/// Which pointer button changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

impl PointerButton {
    /// Maps a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            2 => Self::Secondary,
            _ => Self::Auxiliary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerDown { x: f64, y: f64, button: PointerButton },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// The pointer left the surface; treated like a release.
    PointerLeave,
    /// The window or the observed element changed size.
    Resize,
}

/// Primary-button state and last known pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub held: bool,
}

impl Default for PointerState {
    /// Starts off-surface so a press before any move injects nothing.
    fn default() -> Self {
        Self {
            x: -99.0,
            y: -99.0,
            held: false,
        }
    }
}

impl PointerState {
    /// Applies a pointer event. Returns `false` for events that are not
    /// pointer events.
    pub fn apply(&mut self, event: &HostEvent) -> bool {
        match *event {
            HostEvent::PointerDown { x, y, button } => {
                self.x = x;
                self.y = y;
                if button == PointerButton::Primary {
                    self.held = true;
                }
            }
            HostEvent::PointerMove { x, y } => {
                self.x = x;
                self.y = y;
            }
            HostEvent::PointerUp | HostEvent::PointerLeave => self.held = false,
            HostEvent::Resize => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pointer_is_off_surface_and_released() {
        let p = PointerState::default();
        assert!(!p.held);
        assert!(p.x < 0.0 && p.y < 0.0);
    }

    #[test]
    fn primary_press_holds_until_release() {
        let mut p = PointerState::default();
        p.apply(&HostEvent::PointerDown {
            x: 4.0,
            y: 5.0,
            button: PointerButton::Primary,
        });
        assert!(p.held);
        p.apply(&HostEvent::PointerMove { x: 10.0, y: 12.0 });
        assert!(p.held);
        assert_eq!((p.x, p.y), (10.0, 12.0));
        p.apply(&HostEvent::PointerUp);
        assert!(!p.held);
        assert_eq!((p.x, p.y), (10.0, 12.0), "release keeps last position");
    }

    #[test]
    fn secondary_press_only_moves() {
        let mut p = PointerState::default();
        p.apply(&HostEvent::PointerDown {
            x: 1.0,
            y: 1.0,
            button: PointerButton::Secondary,
        });
        assert!(!p.held);
        assert_eq!(p.x, 1.0);
    }

    #[test]
    fn leave_releases() {
        let mut p = PointerState {
            x: 3.0,
            y: 3.0,
            held: true,
        };
        assert!(p.apply(&HostEvent::PointerLeave));
        assert!(!p.held);
    }

    #[test]
    fn resize_is_not_a_pointer_event() {
        let mut p = PointerState::default();
        assert!(!p.apply(&HostEvent::Resize));
        assert_eq!(p, PointerState::default());
    }

    #[test]
    fn dom_button_codes() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
    }
}
