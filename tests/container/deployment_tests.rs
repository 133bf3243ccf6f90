//! Artifact, connector, and datasource deployment against the in-memory agent.

use super::helpers::{TestContext, context, create_request};
use container_manager::container::{
    adapters::AgentCall,
    services::{ContainerManagerError, DatasourceRequest},
};
use rstest::rstest;

async fn created(context: impl Future<Output = TestContext>) -> TestContext {
    let ctx = context.await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    ctx
}

fn describe(call: &AgentCall) -> String {
    match call {
        AgentCall::DeployArtifact { artifact, .. } => format!("deploy {artifact}"),
        AgentCall::UndeployArtifact { artifact, .. } => format!("undeploy {artifact}"),
        AgentCall::ArtifactStatus { artifact, .. } => format!("status {artifact}"),
        AgentCall::TaskStatus { .. } => "poll".to_owned(),
        AgentCall::ServerStatus { server } => format!("server {server}"),
        other => format!("{other:?}"),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_deploy_polls_descriptor_before_plan(#[future] context: TestContext) {
    let ctx = created(context).await;
    ctx.agent
        .set_polls_before_resolution(1)
        .expect("agent setup should succeed");
    let calls_before = ctx.agent.calls().expect("calls should be readable").len();

    ctx.service
        .deploy("app1", "http://repo.example/apps/app.war")
        .await
        .expect("deploy should succeed");

    let calls = ctx.agent.calls().expect("calls should be readable");
    let observed: Vec<String> = calls.iter().skip(calls_before).map(describe).collect();
    assert_eq!(
        observed,
        [
            "status repo-repo.example.xml",
            "deploy repo-repo.example.xml",
            "poll",
            "status repo-repo.example.xml",
            "deploy app-plan.xml",
            "poll",
            "status app-plan.xml",
            "server app1",
        ]
    );
    let submissions = calls
        .iter()
        .skip(calls_before)
        .filter(|call| call.is_submission())
        .count();
    assert_eq!(submissions, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_artifact_from_same_host_reuses_repository(#[future] context: TestContext) {
    let ctx = created(context).await;

    for url in [
        "http://repo.example/apps/app.war",
        "http://repo.example/apps/billing.ear",
    ] {
        ctx.service
            .deploy("app1", url)
            .await
            .expect("deploy should succeed");
    }

    assert_eq!(
        ctx.agent
            .deployed_artifacts()
            .expect("calls should be readable"),
        ["repo-repo.example.xml", "app-plan.xml", "billing-plan.xml"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undeploy_removes_plan_and_keeps_repository(#[future] context: TestContext) {
    let ctx = created(context).await;
    ctx.service
        .deploy("app1", "http://repo.example/apps/app.war")
        .await
        .expect("deploy should succeed");

    ctx.service
        .undeploy("app1", "http://repo.example/apps/app.war")
        .await
        .expect("undeploy should succeed");

    let undeployed: Vec<String> = ctx
        .agent
        .calls()
        .expect("calls should be readable")
        .into_iter()
        .filter_map(|call| match call {
            AgentCall::UndeployArtifact { artifact, .. } => Some(artifact),
            _ => None,
        })
        .collect();
    assert_eq!(undeployed, ["app-plan.xml"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_deploy_task_surfaces_remote_error(#[future] context: TestContext) {
    let ctx = created(context).await;
    ctx.agent
        .fail_next_task()
        .expect("agent setup should succeed");

    let result = ctx
        .service
        .deploy("app1", "http://repo.example/apps/app.war")
        .await;

    assert!(matches!(result, Err(ContainerManagerError::RemoteTask { .. })));
    assert_eq!(
        ctx.agent
            .deployed_artifacts()
            .expect("calls should be readable"),
        ["repo-repo.example.xml"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connector_is_recorded_once(#[future] context: TestContext) {
    let ctx = created(context).await;

    ctx.service
        .add_connector("app1", "http", 9080)
        .await
        .expect("first add should succeed");
    let record = ctx
        .service
        .add_connector("app1", "http", 9080)
        .await
        .expect("second add should succeed");

    assert_eq!(record.connectors().len(), 1);
    assert_eq!(
        ctx.agent
            .deployed_artifacts()
            .expect("calls should be readable"),
        ["connector-http.xml"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn datasource_can_be_added_and_removed(#[future] context: TestContext) {
    let ctx = created(context).await;

    let added = ctx
        .service
        .add_datasource(
            "app1",
            DatasourceRequest::new(
                "orders",
                "jdbc:postgresql://db/orders",
                "org.postgresql.Driver",
                "app",
            ),
        )
        .await
        .expect("add should succeed");
    let removed = ctx
        .service
        .remove_datasource("app1", "orders")
        .await
        .expect("remove should succeed");

    assert_eq!(added.datasources().len(), 1);
    assert!(removed.datasources().is_empty());
    assert!(removed.version() > added.version());
}
