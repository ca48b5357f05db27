mod common;

use apiconv_fix::{
    compute_undocumented, ActualOutcome, ConventionFix, DeclaredOutcomeCollector, EditResult,
    FixError, FixHost, RecordedActualOutcomes,
};
use apiconv_source::{AnnotationArg, Document, TypeDecl, TypeRef};
use apiconv_symbol::{SourceKind, SymbolCache, WellKnownNames};
use apiconv_test_utils::{
    controller_document, convention_post, convention_type, conventions_document, doc_id,
    post_item, produces, standard_fixture, symbol, Fixture, CONTROLLER_DOC,
    CONVENTIONS_DOC, OPERATION,
};
use common::{diagnostic, host, recorded, CountingActual, SharedWorkspace};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn outcome_statuses(document: &Document, path: &str) -> Vec<i64> {
    document
        .method(&path.parse().unwrap())
        .unwrap()
        .annotations
        .iter()
        .filter(|a| a.name.name().is_some_and(|n| n.contains("ProducesResponseType")))
        .filter_map(|a| a.first_int())
        .collect()
}

#[tokio::test]
async fn test_existing_convention_gains_missing_outcome() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let actual = recorded(vec![ActualOutcome::status(400), ActualOutcome::default_response()]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let result = fix.compute(&CancellationToken::new()).await.unwrap().unwrap();
    let EditResult::Document(changed) = result else {
        panic!("expected a single-document edit, got {result:?}");
    };

    assert_eq!(changed.id, doc_id(CONVENTIONS_DOC));
    assert_eq!(outcome_statuses(&changed.document, "Conventions.Post"), vec![200, 400]);
    assert!(changed.text.contains("[ProducesResponseType(400)]"));
    assert!(changed.text.contains("public static void Post("));
}

#[tokio::test]
async fn test_no_convention_type_means_no_fix() {
    let fixture = Fixture::new([controller_document(Vec::new(), post_item(Vec::new()))]);
    let actual = recorded(vec![ActualOutcome::status(404)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    assert_eq!(fix.compute(&CancellationToken::new()).await.unwrap(), None);
    assert!(fix.is_computed());
}

#[tokio::test]
async fn test_inline_outcomes_move_to_new_convention() {
    let fixture = standard_fixture(vec![produces(200)], Vec::new());
    let actual = recorded(vec![ActualOutcome::status(404)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let result = fix.compute(&CancellationToken::new()).await.unwrap().unwrap();
    let EditResult::Solution(changes) = result else {
        panic!("expected a multi-document edit, got {result:?}");
    };
    assert_eq!(changes.len(), 2);

    let controller = changes.iter().find(|c| c.id == doc_id(CONTROLLER_DOC)).unwrap();
    assert!(outcome_statuses(&controller.document, "ItemsController.PostItem").is_empty());
    assert!(!controller.text.contains("ProducesResponseType"));

    let conventions = changes.iter().find(|c| c.id == doc_id(CONVENTIONS_DOC)).unwrap();
    let post = conventions
        .document
        .method(&"Conventions.Post".parse().unwrap())
        .unwrap();
    assert_eq!(post.parameters.len(), 1);
    assert_eq!(post.parameters[0].name, "model");
    assert_eq!(post.parameters[0].ty, TypeRef::Any);
    assert_eq!(outcome_statuses(&conventions.document, "Conventions.Post"), vec![200, 404]);

    let text = &conventions.text;
    assert!(text.contains("[ProducesResponseType(200)]"));
    assert!(text.contains("[ProducesResponseType(404)]"));
    assert!(text.contains("[ApiConventionNameMatch(ApiConventionNameMatchBehavior.Prefix)]"));
    assert!(text.contains(
        "[ApiConventionNameMatch(ApiConventionNameMatchBehavior.Suffix), \
         ApiConventionTypeMatch(ApiConventionTypeMatchBehavior.Any)] object model"
    ));
}

#[tokio::test]
async fn test_same_file_convention_is_one_document_edit() {
    let mut document = controller_document(
        vec![convention_type("LocalConventions")],
        post_item(vec![produces(201)]),
    );
    document.types.push(TypeDecl::new("LocalConventions"));
    let fixture = Fixture::new([document]);
    let actual = recorded(vec![ActualOutcome::status(409)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let cancel = CancellationToken::new();
    let changed = fix.changed_document(&cancel).await.unwrap().unwrap();
    assert_eq!(changed.id, doc_id(CONTROLLER_DOC));
    assert!(outcome_statuses(&changed.document, "ItemsController.PostItem").is_empty());
    assert_eq!(
        outcome_statuses(&changed.document, "LocalConventions.Post"),
        vec![201, 409]
    );
    assert_eq!(fix.changed_solution(&cancel).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_applied_fix_leaves_nothing_undocumented() {
    let fixture = standard_fixture(vec![produces(200)], Vec::new());
    let outcomes = vec![ActualOutcome::status(404), ActualOutcome::default_response()];
    let fix = ConventionFix::new(
        host(&fixture, Arc::new(recorded(outcomes.clone()))),
        diagnostic(),
    );
    let cancel = CancellationToken::new();
    let changes = fix.changed_solution(&cancel).await.unwrap().to_vec();
    assert!(!changes.is_empty());

    let mut workspace = fixture.workspace();
    workspace.commit(&changes);
    let index = Arc::new(fixture.index());
    for change in &changes {
        index
            .index_document(&change.document, SourceKind::Source)
            .unwrap();
    }
    let after = FixHost::with_defaults(
        Arc::new(workspace),
        Arc::clone(&index),
        Arc::new(RecordedActualOutcomes::new()),
        WellKnownNames::default(),
    );

    let cache = SymbolCache::new(&index, WellKnownNames::default()).unwrap();
    let operation = index.get_operation(&symbol(OPERATION)).unwrap();
    assert!(operation.single_reference().is_some());
    let convention = index
        .get_operation(&symbol("TestApp.Conventions.Post"))
        .unwrap();
    assert!(convention.single_reference().is_some());
    let declared = after
        .declared
        .declared_outcomes(&cache, &operation, &cancel)
        .await
        .unwrap();

    assert!(declared
        .iter()
        .all(|d| d.declaring_operation == symbol("TestApp.Conventions.Post")));
    assert_eq!(compute_undocumented(&declared, &outcomes), Vec::new());

    // a fresh fix on the updated workspace has nothing left to do
    let again = ConventionFix::new(
        FixHost {
            actual: Arc::new(recorded(outcomes)),
            ..after
        },
        diagnostic(),
    );
    assert_eq!(again.compute(&cancel).await.unwrap(), None);
}

#[tokio::test]
async fn test_unclassifiable_body_means_no_fix() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let actual = RecordedActualOutcomes::new().with_unclassifiable(symbol(OPERATION));
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    assert_eq!(fix.compute(&CancellationToken::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_fully_documented_operation_means_no_fix() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200, 400])]);
    let actual = recorded(vec![ActualOutcome::status(400), ActualOutcome::default_response()]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    assert_eq!(fix.compute(&CancellationToken::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_generated_convention_is_not_edited() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])])
        .with_generated(CONVENTIONS_DOC);
    let actual = recorded(vec![ActualOutcome::status(400)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    assert_eq!(fix.compute(&CancellationToken::new()).await.unwrap(), None);
}

fn convention_methods(document: &Document) -> Vec<(usize, Vec<i64>)> {
    document
        .type_decl(&"Conventions".parse().unwrap())
        .unwrap()
        .methods
        .iter()
        .map(|m| {
            let statuses = m
                .annotations
                .iter()
                .filter(|a| a.name.name().is_some_and(|n| n.contains("ProducesResponseType")))
                .filter_map(|a| a.first_int())
                .collect();
            (m.parameters.len(), statuses)
        })
        .collect()
}

#[tokio::test]
async fn test_overloaded_convention_gets_new_overload() {
    let mut overload = convention_post(&[200]);
    overload.parameters.clear();
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200]), overload]);
    let actual = recorded(vec![ActualOutcome::status(400)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let changed = fix
        .changed_document(&CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changed.id, doc_id(CONVENTIONS_DOC));
    assert_eq!(
        convention_methods(&changed.document),
        vec![(1, vec![200]), (0, vec![200]), (1, vec![400])]
    );
}

#[tokio::test]
async fn test_inline_outcomes_move_next_to_same_signature_convention() {
    let fixture = standard_fixture(vec![produces(200)], vec![convention_post(&[200])]);
    let actual = recorded(vec![ActualOutcome::status(404)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let changes = fix.changed_solution(&CancellationToken::new()).await.unwrap();
    assert_eq!(changes.len(), 2);

    let controller = changes.iter().find(|c| c.id == doc_id(CONTROLLER_DOC)).unwrap();
    assert!(outcome_statuses(&controller.document, "ItemsController.PostItem").is_empty());

    let conventions = changes.iter().find(|c| c.id == doc_id(CONVENTIONS_DOC)).unwrap();
    assert_eq!(
        convention_methods(&conventions.document),
        vec![(1, vec![200]), (1, vec![200, 404])]
    );
    assert_eq!(conventions.text.matches("public static void Post(").count(), 2);
}

#[tokio::test]
async fn test_assembly_conventions_used_when_type_has_none() {
    let mut conventions = conventions_document(vec![convention_post(&[200])]);
    conventions
        .assembly_annotations
        .push(convention_type("TestApp.Conventions"));
    let fixture = Fixture::new([
        controller_document(Vec::new(), post_item(Vec::new())),
        conventions,
    ]);
    let actual = recorded(vec![ActualOutcome::status(422)]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(actual)), diagnostic());

    let changed = fix
        .changed_document(&CancellationToken::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome_statuses(&changed.document, "Conventions.Post"), vec![200, 422]);
}

#[tokio::test]
async fn test_missing_well_known_type_means_no_fix() {
    let fixture = standard_fixture(vec![produces(200)], Vec::new());
    let names = WellKnownNames {
        produces_response_type: "Other.Web.ProducesAttribute".to_string(),
        ..WellKnownNames::default()
    };
    let host = FixHost {
        names,
        ..host(&fixture, Arc::new(recorded(vec![ActualOutcome::status(404)])))
    };
    let fix = ConventionFix::new(host, diagnostic());

    assert_eq!(fix.compute(&CancellationToken::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_document_is_host_error() {
    let fixture = Fixture::new([conventions_document(Vec::new())]);
    let fix = ConventionFix::new(host(&fixture, Arc::new(recorded(Vec::new()))), diagnostic());

    let err = fix.compute(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, FixError::DocumentUnavailable(id) if id == doc_id(CONTROLLER_DOC)));
    assert!(!fix.is_computed());
}

#[tokio::test]
async fn test_result_is_computed_once() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let actual = Arc::new(CountingActual::new(recorded(vec![ActualOutcome::status(400)])));
    let fix = ConventionFix::new(host(&fixture, Arc::clone(&actual) as _), diagnostic());
    let cancel = CancellationToken::new();

    let first = fix.compute(&cancel).await.unwrap().map(|r| r as *const EditResult);
    let second = fix.compute(&cancel).await.unwrap().map(|r| r as *const EditResult);

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(actual.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_computation() {
    let fixture = standard_fixture(vec![produces(200)], Vec::new());
    let actual = Arc::new(CountingActual::new(recorded(vec![ActualOutcome::status(404)])));
    let fix = ConventionFix::new(host(&fixture, Arc::clone(&actual) as _), diagnostic());
    let cancel = CancellationToken::new();

    let (a, b) = futures::join!(fix.compute(&cancel), fix.compute(&cancel));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(actual.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let actual = Arc::new(CountingActual::new(recorded(vec![ActualOutcome::status(400)])));
    let fix = ConventionFix::new(host(&fixture, Arc::clone(&actual) as _), diagnostic());

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    assert!(fix.compute(&cancelled).await.unwrap_err().is_cancelled());
    assert_eq!(actual.calls(), 0);
    assert!(!fix.is_computed());

    let result = fix.compute(&CancellationToken::new()).await.unwrap();
    assert!(result.is_some());
}

#[tokio::test]
async fn test_cancelled_while_running() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let actual = Arc::new(
        CountingActual::new(recorded(vec![ActualOutcome::status(400)])).cancelling_first_call(),
    );
    let fix = ConventionFix::new(host(&fixture, Arc::clone(&actual) as _), diagnostic());

    let cancel = CancellationToken::new();
    let err = fix.compute(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(cancel.is_cancelled());

    // nothing was remembered, so a live token starts over
    let result = fix.compute(&CancellationToken::new()).await.unwrap();
    assert!(result.is_some());
    assert_eq!(actual.calls(), 2);
}

#[tokio::test]
async fn test_document_changed_since_plan_is_rejected() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let shared = Arc::new(SharedWorkspace::new(fixture.workspace()));
    let host = FixHost::with_defaults(
        Arc::clone(&shared) as _,
        Arc::new(fixture.index()),
        Arc::new(recorded(vec![ActualOutcome::status(400)])),
        WellKnownNames::default(),
    );

    // the conventions file is edited after the plan is built but before it
    // is applied
    let mut chain = apiconv_fix::StrategyChain::new();
    chain.push(Arc::new(strategies::EditThenPlan {
        shared: Arc::clone(&shared),
    }));
    let fix = ConventionFix::new(host, diagnostic()).with_chain(chain);

    let err = fix.compute(&CancellationToken::new()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        FixError::Edit(apiconv_source::EditError::BaseMismatch { ref document, .. })
            if *document == doc_id(CONVENTIONS_DOC)
    ));
}

#[tokio::test]
async fn test_declared_outcome_keeps_annotation_arguments() {
    let fixture = standard_fixture(Vec::new(), vec![convention_post(&[200])]);
    let index = fixture.index();
    let cache = SymbolCache::new(&index, WellKnownNames::default()).unwrap();
    let host = host(&fixture, Arc::new(recorded(Vec::new())));
    let operation = index.get_operation(&symbol(OPERATION)).unwrap();

    let declared = host
        .declared
        .declared_outcomes(&cache, &operation, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(declared.len(), 1);
    assert_eq!(declared[0].status_code, 200);
    assert_eq!(declared[0].declaration_site.args, vec![AnnotationArg::Int(200)]);
}

mod strategies {
    use super::common::SharedWorkspace;
    use apiconv_fix::{FixContext, FixError, FixStrategy, StrategyOutcome};
    use apiconv_source::{EditPlan, TypeDecl};
    use apiconv_test_utils::{doc_id, CONVENTIONS_DOC};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Builds a plan, then changes the document it targets
    #[derive(Debug)]
    pub struct EditThenPlan {
        pub shared: Arc<SharedWorkspace>,
    }

    #[async_trait]
    impl FixStrategy for EditThenPlan {
        async fn execute(&self, ctx: &FixContext) -> Result<StrategyOutcome, FixError> {
            let document = ctx.load_document(&doc_id(CONVENTIONS_DOC)).await?;
            let mut builder = EditPlan::builder();
            builder.add_member(
                &document,
                "Conventions".parse().unwrap(),
                apiconv_source::MethodDecl::new("Put"),
            );
            let plan = builder.build()?;

            let mut edited = document.as_ref().clone();
            edited.types.push(TypeDecl::new("MoreConventions"));
            self.shared.replace(edited);

            Ok(StrategyOutcome::Applied(plan))
        }

        fn name(&self) -> &'static str {
            "edit-then-plan"
        }
    }
}
