//! vCard (`vcard-temp`) profile module.
//!
//! # Responsibility
//! - Classify inbound IQs addressed to the vCard extension.
//! - Serve profile fetches and owner-restricted profile updates.
//! - Serialize all store access through one [`SerialExecutor`].
//!
//! # Invariants
//! - Every processed request routes exactly one response.
//! - Fetch requests carry an empty vCard element; anything else is `bad-request`.
//! - Updates are only accepted when addressed to the server or to the
//!   requester's own node; rejected updates never reach the store.
//! - Reads are not ownership-checked.

use crate::config::VCardConfig;
use crate::model::element::Element;
use crate::model::iq::{Iq, IqType};
use crate::module::disco::DiscoInfo;
use crate::module::executor::SerialExecutor;
use crate::module::router::Router;
use crate::module::{IqHandler, ModuleError};
use crate::store::VCardStore;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Extension namespace served by this module.
pub const VCARD_NAMESPACE: &str = "vcard-temp";
/// Payload element name served by this module.
pub const VCARD_ELEMENT: &str = "vCard";

const EXECUTOR_NAME: &str = "vcard-module";

/// vCard IQ handler module.
pub struct VCard {
    executor: SerialExecutor,
    store: Arc<dyn VCardStore>,
}

impl VCard {
    /// Starts the module and advertises its namespace through `disco`.
    pub fn new(
        config: &VCardConfig,
        store: Arc<dyn VCardStore>,
        disco: Option<&mut DiscoInfo>,
    ) -> Result<Self, ModuleError> {
        config.validate()?;
        if let Some(disco) = disco {
            disco.register_server_feature(VCARD_NAMESPACE)?;
            disco.register_account_feature(VCARD_NAMESPACE)?;
        }
        let executor = SerialExecutor::spawn(EXECUTOR_NAME, config.mailbox_size)?;
        info!(
            "event=module_start module=vcard status=ok mailbox_size={}",
            config.mailbox_size
        );
        Ok(Self { executor, store })
    }
}

impl IqHandler for VCard {
    fn matches_iq(&self, iq: &Iq) -> bool {
        (iq.is_get() || iq.is_set()) && vcard_elements(iq).count() == 1
    }

    fn process_iq(&self, iq: Iq, router: Arc<dyn Router>) -> Result<(), ModuleError> {
        let store = Arc::clone(&self.store);
        self.executor
            .execute(move || handle_iq(&iq, store.as_ref(), router.as_ref()))?;
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ModuleError> {
        self.executor.shutdown()?;
        info!("event=module_stop module=vcard status=ok");
        Ok(())
    }
}

fn vcard_elements(iq: &Iq) -> impl Iterator<Item = &Element> {
    iq.elements()
        .iter()
        .filter(|element| element.is(VCARD_ELEMENT, VCARD_NAMESPACE))
}

/// Runs on the module executor only.
fn handle_iq(iq: &Iq, store: &dyn VCardStore, router: &dyn Router) {
    let mut vcards = vcard_elements(iq);
    let (Some(vcard), None) = (vcards.next(), vcards.next()) else {
        route(router, iq.bad_request_error());
        return;
    };

    match iq.kind() {
        IqType::Get => get_vcard(vcard, iq, store, router),
        IqType::Set => set_vcard(vcard, iq, store, router),
        IqType::Result | IqType::Error => route(router, iq.bad_request_error()),
    }
}

fn get_vcard(vcard: &Element, iq: &Iq, store: &dyn VCardStore, router: &dyn Router) {
    if vcard.children_count() > 0 {
        route(router, iq.bad_request_error());
        return;
    }

    let to = iq.to();
    let node = to.node().unwrap_or_default();
    let record = match store.fetch_vcard(node) {
        Ok(record) => record,
        Err(err) => {
            error!(
                "event=vcard_fetch module=vcard status=error node={} error={}",
                node, err
            );
            route(router, iq.internal_server_error());
            return;
        }
    };
    info!(
        "event=vcard_fetch module=vcard status=ok node={} resource={} found={}",
        node,
        to.resource().unwrap_or_default(),
        record.is_some()
    );

    let mut result = iq.result_iq();
    result.append_element(
        record.unwrap_or_else(|| Element::with_namespace(VCARD_ELEMENT, VCARD_NAMESPACE)),
    );
    route(router, result);
}

fn set_vcard(vcard: &Element, iq: &Iq, store: &dyn VCardStore, router: &dyn Router) {
    let from = iq.from();
    let to = iq.to();
    if !(to.is_server() || to.same_node(from)) {
        warn!(
            "event=vcard_update module=vcard status=forbidden from={} to={}",
            from, to
        );
        route(router, iq.forbidden_error());
        return;
    }

    let node = to.node().unwrap_or_default();
    if let Err(err) = store.upsert_vcard(vcard, node) {
        error!(
            "event=vcard_update module=vcard status=error node={} error={}",
            node, err
        );
        route(router, iq.internal_server_error());
        return;
    }
    info!(
        "event=vcard_update module=vcard status=ok node={} resource={}",
        node,
        to.resource().unwrap_or_default()
    );
    route(router, iq.result_iq());
}

fn route(router: &dyn Router, response: Iq) {
    let id = response.id().to_string();
    if let Err(err) = router.route(response) {
        debug!(
            "event=iq_route module=vcard status=dropped id={} error={}",
            id, err
        );
    }
}
