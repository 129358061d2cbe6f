//! The collection creation flow: form and selection state plus submit.

use collection_types::{CollectionForm, FormField};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use crate::contract::{MintedEvent, TokenContract};
use crate::mint::mint_all;
use crate::pinning::Pinner;
use crate::report::SubmitReport;
use crate::selection::{DropOutcome, FileSelection};
use crate::upload::upload_collection;

/// Contract and event decoding used by the mint stage.
pub struct Minting<C> {
    pub contract: C,
    pub event: MintedEvent,
}

/// Holds the in-flight flag for the duration of a submit.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CollectionFlow<P, C> {
    pinner: Arc<P>,
    minting: Option<Minting<C>>,
    form: CollectionForm,
    selection: FileSelection,
    in_flight: AtomicBool,
}

impl<P, C> CollectionFlow<P, C>
where
    P: Pinner + 'static,
    C: TokenContract,
{
    /// `minting: None` pins everything and stops before the contract.
    pub fn new(pinner: Arc<P>, minting: Option<Minting<C>>) -> Self {
        Self {
            pinner,
            minting,
            form: CollectionForm::new(),
            selection: FileSelection::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn form(&self) -> &CollectionForm {
        &self.form
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn set_form(&mut self, form: CollectionForm) {
        self.form = form;
    }

    /// Accepted files replace the current selection.
    pub fn drop_files(&mut self, outcome: DropOutcome) {
        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "Files dropped"
        );
        self.selection.replace(outcome.accepted);
    }

    /// `None` in upload-only mode.
    pub fn contract(&self) -> Option<&C> {
        self.minting.as_ref().map(|m| &m.contract)
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether the submit button would be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && !self.selection.is_empty()
    }

    /// Upload everything, then mint one token per image.
    ///
    /// Upload failures abort with `Err`; mint failures are recorded in the
    /// report and do not stop later images.
    pub async fn submit(&self) -> Result<SubmitReport, crate::Error> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(crate::Error::Busy)?;
        if self.selection.is_empty() {
            return Err(crate::Error::NothingSelected);
        }
        self.form.validate()?;

        info!(
            collection = %self.form.name,
            symbol = %self.form.symbol,
            images = self.selection.len(),
            "Creating collection"
        );

        let manifest = upload_collection(&self.pinner, &self.form, self.selection.files())
            .await
            .inspect_err(|e| error!(error = %e, "Error creating collection"))?;

        let mints = match &self.minting {
            Some(minting) => {
                mint_all(&minting.contract, &minting.event, &manifest.metadata_uris).await
            }
            None => {
                info!("Minting disabled, upload only");
                Vec::new()
            }
        };

        Ok(SubmitReport { manifest, mints })
    }
}
