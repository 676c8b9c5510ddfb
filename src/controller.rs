/// Split action controller: detection, single-flight execution and DOM updates
use crate::config::Config;
use crate::cover::Region;
use crate::error::SplitError;
use crate::host::{ActivateFn, ActivationFuture, PageHost};
use crate::page::PageContext;
use crate::splitter::ImageSplitter;
use crate::updater::{CoverRefs, CoverUpdater};
use log::{debug, error, info, trace, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Mutual-exclusion token for the split action
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: Rc<Cell<bool>>,
}

/// Held while an action runs; released on drop
#[derive(Debug)]
pub struct FlightPermit {
    busy: Rc<Cell<bool>>,
}

impl SingleFlight {
    pub fn try_acquire(&self) -> Option<FlightPermit> {
        if self.busy.replace(true) {
            return None;
        }
        Some(FlightPermit {
            busy: Rc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

/// The cover a control was installed for
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTarget {
    pub resource_id: String,
    pub source_url: String,
    pub natural_height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetupOutcome {
    Installed,
    AlreadyInstalled,
    NotAResourcePage,
    NotSplittable,
}

/// Terminal result of one activation
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    Completed(CoverRefs),
    Rejected(String),
    Failed(SplitError),
}

impl From<Result<CoverRefs, SplitError>> for ActivationOutcome {
    fn from(result: Result<CoverRefs, SplitError>) -> Self {
        match result {
            Ok(refs) => ActivationOutcome::Completed(refs),
            Err(SplitError::RemoteDomain(message)) => ActivationOutcome::Rejected(message),
            Err(err) => ActivationOutcome::Failed(err),
        }
    }
}

pub struct ActionController<H, S, U> {
    host: H,
    splitter: S,
    updater: U,
    config: Rc<Config>,
    flight: SingleFlight,
    target: RefCell<Option<SplitTarget>>,
}

impl<H, S, U> ActionController<H, S, U>
where
    H: PageHost + 'static,
    S: ImageSplitter + 'static,
    U: CoverUpdater + 'static,
{
    pub fn new(host: H, splitter: S, updater: U, config: Rc<Config>) -> Self {
        ActionController {
            host,
            splitter,
            updater,
            config,
            flight: SingleFlight::default(),
            target: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    /// Install the control if this page offers a split. Idempotent.
    pub async fn setup(self: &Rc<Self>) -> SetupOutcome {
        if self.host.is_control_present() {
            return SetupOutcome::AlreadyInstalled;
        }

        let target = match self.detect().await {
            Ok(target) => target,
            Err(outcome) => return outcome,
        };

        // Another setup may have finished while this one was waiting
        if self.host.is_control_present() {
            return SetupOutcome::AlreadyInstalled;
        }

        info!("Offering cover split for movie {}", target.resource_id);
        *self.target.borrow_mut() = Some(target);
        self.host.install_control(self.activation_handler());

        SetupOutcome::Installed
    }

    /// Re-run detection after navigation.
    ///
    /// When the host kept the old DOM, the existing control is retargeted and
    /// shown again only if the current page still offers a split.
    pub async fn rearm(self: &Rc<Self>) -> SetupOutcome {
        if !self.host.is_control_present() {
            return self.setup().await;
        }
        if self.is_busy() {
            return SetupOutcome::AlreadyInstalled;
        }

        match self.detect().await {
            Ok(target) => {
                *self.target.borrow_mut() = Some(target);
                self.host.set_control_hidden(false);
                SetupOutcome::AlreadyInstalled
            }
            Err(outcome) => {
                self.host.set_control_hidden(true);
                outcome
            }
        }
    }

    async fn detect(&self) -> Result<SplitTarget, SetupOutcome> {
        self.host.wait_until_ready().await;

        let location = self.host.location();
        let Some(context) = PageContext::from_location(&location) else {
            trace!("Not a resource page: {}", location);
            return Err(SetupOutcome::NotAResourcePage);
        };

        let covers = self.host.find_cover_images().await;
        let Some(front) = covers.splittable_front(&self.config.shape) else {
            trace!(
                "Movie {} not splittable (front present: {}, {}x{}, back present: {})",
                context.resource_id,
                covers.front.present,
                covers.front.natural_width,
                covers.front.natural_height,
                covers.back.present
            );
            return Err(SetupOutcome::NotSplittable);
        };

        Ok(SplitTarget {
            resource_id: context.resource_id,
            source_url: front.source_url.clone(),
            natural_height: front.natural_height,
        })
    }

    fn activation_handler(self: &Rc<Self>) -> ActivateFn {
        let weak = Rc::downgrade(self);
        Rc::new(move || -> Option<ActivationFuture> {
            let this = weak.upgrade()?;
            let (permit, target) = this.begin()?;
            let run: ActivationFuture = Box::pin(async move { this.run(permit, target).await });
            Some(run)
        })
    }

    /// Synchronous half of an activation: take the token and disable the control
    fn begin(&self) -> Option<(FlightPermit, SplitTarget)> {
        let Some(permit) = self.flight.try_acquire() else {
            debug!("Split already in progress, ignoring activation");
            return None;
        };
        let target = self.target.borrow().clone()?;

        self.host.set_control_disabled(true);
        Some((permit, target))
    }

    async fn run(&self, permit: FlightPermit, target: SplitTarget) -> ActivationOutcome {
        info!("Splitting cover of movie {}", target.resource_id);

        let outcome = ActivationOutcome::from(self.split_and_update(&target).await);
        self.apply(&target, &outcome);

        drop(permit);
        outcome
    }

    async fn split_and_update(&self, target: &SplitTarget) -> Result<CoverRefs, SplitError> {
        let front_region: Region = self.config.front_band.region(target.natural_height);
        let back_region: Region = self.config.back_band.region(target.natural_height);

        let front = self.splitter.split(&target.source_url, front_region).await?;
        let back = self.splitter.split(&target.source_url, back_region).await?;

        self.updater.update(&target.resource_id, &front, &back).await
    }

    /// Whether the page still shows the resource `target` was detected on
    fn is_showing(&self, target: &SplitTarget) -> bool {
        PageContext::from_location(&self.host.location())
            .is_some_and(|context| context.resource_id == target.resource_id)
    }

    fn apply(&self, target: &SplitTarget, outcome: &ActivationOutcome) {
        match outcome {
            // The page moved on; its elements belong to another resource
            ActivationOutcome::Completed(refs) if !self.is_showing(target) => {
                info!(
                    "Covers of movie {} updated after leaving its page, back cover at {}",
                    target.resource_id, refs.back_ref
                );
            }
            ActivationOutcome::Completed(refs) => {
                info!("Covers updated, back cover at {}", refs.back_ref);
                self.host.reload_front_cover();
                self.host.insert_back_cover(&refs.back_ref);
                self.host.set_control_hidden(true);
            }
            ActivationOutcome::Rejected(message) => {
                warn!("Cover update rejected: {}", message);
                self.host.alert(message);
                self.host.set_control_disabled(false);
            }
            ActivationOutcome::Failed(err) => {
                error!("Cover split failed: {}", err);
                self.host.set_control_disabled(false);
            }
        }
    }
}
