/// Capability interface over the host page
use crate::controller::ActivationOutcome;
use crate::cover::CoverImages;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

pub type ActivationFuture = Pin<Box<dyn Future<Output = ActivationOutcome>>>;

/// Invoked on user activation of the control.
///
/// `None` means the activation was refused and the event must be suppressed;
/// otherwise the returned future runs the split action to its outcome.
pub type ActivateFn = Rc<dyn Fn() -> Option<ActivationFuture>>;

#[async_trait(?Send)]
pub trait PageHost {
    fn location(&self) -> String;

    fn is_control_present(&self) -> bool;

    fn is_edit_mode(&self) -> bool;

    /// Resolves once the detail container and the button group exist
    async fn wait_until_ready(&self);

    /// Reads both cover slots, waiting for a present front image to finish loading
    async fn find_cover_images(&self) -> CoverImages;

    fn install_control(&self, on_activate: ActivateFn);

    fn set_control_disabled(&self, disabled: bool);

    fn set_control_hidden(&self, hidden: bool);

    /// Adds a back cover next to the front one, showing `back_ref`
    fn insert_back_cover(&self, back_ref: &str);

    fn reload_front_cover(&self);

    fn alert(&self, message: &str);
}

/// What a navigation tick sees of the page
#[derive(Debug, Clone, PartialEq)]
pub struct PageObservation {
    pub location: String,
    pub control_present: bool,
    pub edit_mode: bool,
}

impl PageObservation {
    pub fn capture(host: &impl PageHost) -> PageObservation {
        PageObservation {
            location: host.location(),
            control_present: host.is_control_present(),
            edit_mode: host.is_edit_mode(),
        }
    }
}
