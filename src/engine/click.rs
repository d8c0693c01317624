use crate::pathway::NodeIdx;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Node(NodeIdx),
    Canvas,
}

/// A press that has been classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    Single { target: ClickTarget, modifier: bool },
    Double { target: ClickTarget },
}

/// Debounce between single and double presses.
///
/// A press is held back for the double-click window. A second press on the same
/// target inside the window turns into a double and the held single is dropped;
/// a press on another target releases the held single first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum ClickState {
    #[default]
    Idle,
    PendingSingle {
        target: ClickTarget,
        modifier: bool,
        deadline: f64,
    },
}

impl ClickState {
    pub(crate) fn press(
        &mut self,
        target: ClickTarget,
        modifier: bool,
        now: f64,
        window_secs: f64,
    ) -> Option<ClickAction> {
        let pending = std::mem::take(self);
        let hold = Self::PendingSingle {
            target,
            modifier,
            deadline: now + window_secs,
        };

        match pending {
            Self::Idle => {
                *self = hold;
                None
            }
            Self::PendingSingle {
                target: held,
                deadline,
                ..
            } if held == target && now < deadline => Some(ClickAction::Double { target }),
            Self::PendingSingle {
                target: held,
                modifier: held_modifier,
                ..
            } => {
                *self = hold;
                Some(ClickAction::Single {
                    target: held,
                    modifier: held_modifier,
                })
            }
        }
    }

    /// Releases a held single once its window has passed.
    pub(crate) fn poll(&mut self, now: f64) -> Option<ClickAction> {
        match *self {
            Self::PendingSingle {
                target,
                modifier,
                deadline,
            } if now >= deadline => {
                *self = Self::Idle;
                Some(ClickAction::Single { target, modifier })
            }
            _ => None,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::PendingSingle { .. })
    }
}
