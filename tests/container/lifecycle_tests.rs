//! Create, start, stop, refresh, and remove against the in-memory agent.

use super::helpers::{TestContext, context, create_request};
use container_manager::container::{
    adapters::{AgentCall, STARTED, STOPPED},
    domain::{ContainerName, ResourceKind},
    ports::{AgentLinkRegistry, ContainerRegistry},
    services::{ContainerManagerError, CreateContainerRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_container_records_reported_state(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.agent
        .set_polls_before_resolution(2)
        .expect("agent setup should succeed");

    let created = ctx
        .service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");

    assert_eq!(created.state().as_str(), STARTED);
    let calls = ctx.agent.calls().expect("calls should be readable");
    assert_eq!(
        calls.first(),
        Some(&AgentCall::CreateServer {
            server: "app1".to_owned(),
            topology: r#"<server name="app1"/>"#.to_owned(),
        })
    );
    let polls = calls
        .iter()
        .filter(|call| matches!(call, AgentCall::TaskStatus { .. }))
        .count();
    assert_eq!(polls, 2);

    let owner = ctx
        .links
        .find_agent_by_resource(ResourceKind::Container, created.id().into_inner())
        .await
        .expect("link lookup should succeed")
        .expect("container should be linked");
    assert_eq!(owner.name().as_str(), "A1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_state_mirrors_whatever_agent_reports(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.agent
        .set_created_status(STOPPED)
        .expect("agent setup should succeed");

    let created = ctx
        .service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");

    assert_eq!(created.state().as_str(), STOPPED);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_then_start_follows_agent_status(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");

    let stopped = ctx
        .service
        .stop_container("app1")
        .await
        .expect("stop should succeed");
    let started = ctx
        .service
        .start_container("app1")
        .await
        .expect("start should succeed");

    assert_eq!(stopped.state().as_str(), STOPPED);
    assert_eq!(started.state().as_str(), STARTED);
    assert!(started.version() > stopped.version());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_stop_task_keeps_in_progress_marker(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    ctx.agent
        .fail_next_task()
        .expect("agent setup should succeed");

    let result = ctx.service.stop_container("app1").await;

    assert!(matches!(result, Err(ContainerManagerError::RemoteTask { .. })));
    let stored = ctx
        .service
        .find_container("app1")
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    assert_eq!(stored.state().as_str(), "STOPPING");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_state_picks_up_out_of_band_changes(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    ctx.agent
        .insert_server("app1", "Failed")
        .expect("agent setup should succeed");

    let refreshed = ctx
        .service
        .refresh_state("app1")
        .await
        .expect("refresh should succeed");

    assert_eq!(refreshed.state().as_str(), "Failed");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_tolerates_server_missing_on_agent(#[future] context: TestContext) {
    let ctx = context.await;
    let created = ctx
        .service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    ctx.agent
        .forget_server("app1")
        .expect("agent setup should succeed");

    ctx.service
        .remove_container("app1")
        .await
        .expect("remove should succeed");

    let name = ContainerName::new("app1").expect("valid container name");
    assert!(
        ctx.containers
            .find_by_name(&name)
            .await
            .expect("lookup should succeed")
            .is_none()
    );
    assert!(
        ctx.links
            .find_agent_by_resource(ResourceKind::Container, created.id().into_inner())
            .await
            .expect("link lookup should succeed")
            .is_none()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_create_is_rejected_before_any_agent_call(#[future] context: TestContext) {
    let ctx = context.await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    let calls_before = ctx.agent.calls().expect("calls should be readable").len();

    let result = ctx.service.create_container(create_request("app1")).await;

    assert!(matches!(result, Err(ContainerManagerError::AlreadyExists(_))));
    assert_eq!(
        ctx.agent.calls().expect("calls should be readable").len(),
        calls_before
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn containers_are_listed_per_owning_agent(#[future] context: TestContext) {
    let ctx = context.await;
    for (name, agent) in [("app1", "A1"), ("app2", "A1"), ("app3", "A2")] {
        ctx.service
            .create_container(CreateContainerRequest::new(name, agent, "cfg-container"))
            .await
            .expect("create should succeed");
    }

    let on_first = ctx
        .service
        .containers_for_agent("A1")
        .await
        .expect("listing should succeed");
    let on_second = ctx
        .service
        .containers_for_agent("A2")
        .await
        .expect("listing should succeed");

    let mut first_names: Vec<&str> = on_first.iter().map(|record| record.name().as_str()).collect();
    first_names.sort_unstable();
    assert_eq!(first_names, ["app1", "app2"]);
    assert_eq!(on_second.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operations_on_unknown_container_report_not_found(#[future] context: TestContext) {
    let ctx = context.await;

    let result = ctx.service.start_container("ghost").await;

    assert!(matches!(result, Err(ContainerManagerError::NotFound(_))));
    assert!(ctx.agent.calls().expect("calls should be readable").is_empty());
}
