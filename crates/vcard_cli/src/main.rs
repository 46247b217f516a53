//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `vcard_core` linkage and print version info.
//! - Drive one update + fetch round trip through the vCard module.
//!
//! Usage: `vcard_cli [config.json]`. Without a config file defaults are used
//! and the store lives in memory.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use vcard_core::{
    init_logging_from_config, ChannelRouter, CoreConfig, DiscoInfo, Element, Iq, IqHandler,
    IqType, Jid, SqliteStore, VCard, VCARD_NAMESPACE,
};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    println!("vcard_core ping={}", vcard_core::ping());
    println!("vcard_core version={}", vcard_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("vcard_cli failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| format!("cannot read `{path}`: {err}"))?;
            CoreConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config).map_err(|err| err.to_string())?;

    let store = SqliteStore::open_in_memory().map_err(|err| err.to_string())?;
    let mut disco = DiscoInfo::new();
    let module = VCard::new(&config.vcard, Arc::new(store), Some(&mut disco))
        .map_err(|err| err.to_string())?;
    println!("disco server_features={:?}", disco.server_features());

    let (router, responses) = ChannelRouter::new();
    let router = Arc::new(router);
    let from = Jid::parse("ortuman@jackal.im/cli").map_err(|err| err.to_string())?;
    let to = from.to_bare();

    let vcard = Element::with_namespace("vCard", VCARD_NAMESPACE)
        .with_child(Element::new("FN").with_text("Miguel"))
        .with_child(Element::new("NICKNAME").with_text("ortuman"));
    let set = Iq::new(IqType::Set, from.clone(), to.clone()).with_element(vcard);
    let get = Iq::new(IqType::Get, from, to)
        .with_element(Element::with_namespace("vCard", VCARD_NAMESPACE));

    for request in [set, get] {
        if !module.matches_iq(&request) {
            return Err(format!("request {} not matched", request.id()));
        }
        module
            .process_iq(request, router.clone())
            .map_err(|err| err.to_string())?;
        let response = responses
            .recv_timeout(RESPONSE_TIMEOUT)
            .map_err(|err| err.to_string())?;
        println!(
            "response id={} type={} error={:?} elements={:?}",
            response.id(),
            response.kind().as_str(),
            response.error(),
            response.elements()
        );
    }

    module.shutdown().map_err(|err| err.to_string())?;
    log::info!("event=cli_done module=cli status=ok");
    Ok(())
}
