mod common;

use apiconv_fix::{ActualOutcome, Diagnostic, ExtractToConventionProvider, FixConfig};
use apiconv_test_utils::{convention_post, doc_id, standard_fixture, CONTROLLER_DOC, DIAGNOSTIC_SPAN};
use common::{diagnostic, host, recorded};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn provider() -> ExtractToConventionProvider {
    ExtractToConventionProvider::new(Arc::new(FixConfig::default()))
}

#[test]
fn test_default_configuration() {
    let provider = provider();
    assert_eq!(provider.fixable_diagnostic_ids(), ["MVC1004".to_string()]);
    assert_eq!(provider.title(), "Extract to convention");
}

#[tokio::test]
async fn test_registers_for_fixable_diagnostic() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let host = host(&fixture, Arc::new(recorded(vec![ActualOutcome::status(400)])));

    let fix = provider().register(&[diagnostic()], host).unwrap();
    assert_eq!(fix.title(), "Extract to convention");
    assert!(!fix.is_computed());

    let result = fix.compute(&CancellationToken::new()).await.unwrap();
    assert!(result.is_some());
}

#[test]
fn test_ignores_missing_or_foreign_diagnostics() {
    let fixture = standard_fixture(Vec::new(), Vec::new());
    let host = host(&fixture, Arc::new(recorded(Vec::new())));
    let provider = provider();
    let other = Diagnostic::new("CS0168", doc_id(CONTROLLER_DOC), DIAGNOSTIC_SPAN);

    assert!(provider.register(&[], host.clone()).is_none());
    assert!(provider.register(&[other.clone()], host.clone()).is_none());
    // only the first diagnostic is considered
    assert!(provider.register(&[other, diagnostic()], host).is_none());
}

#[test]
fn test_configured_ids_and_title() {
    let fixture = standard_fixture(Vec::new(), Vec::new());
    let host = host(&fixture, Arc::new(recorded(Vec::new())));
    let config = FixConfig::new()
        .with_diagnostic_ids(["API1000"])
        .with_title("Move to conventions");
    let provider = ExtractToConventionProvider::new(Arc::new(config));

    assert!(provider.register(&[diagnostic()], host.clone()).is_none());

    let api = Diagnostic::new("API1000", doc_id(CONTROLLER_DOC), DIAGNOSTIC_SPAN)
        .with_message("undocumented status code");
    let fix = provider.register(&[api], host).unwrap();
    assert_eq!(fix.title(), "Move to conventions");
    assert_eq!(fix.diagnostic().message.as_deref(), Some("undocumented status code"));
}
