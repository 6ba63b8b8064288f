use crate::common::{listing_page, test_config, ALARM, ALTERED_STRIKE, SPELL_LIST};
use spell_harvest::{
    CollectingNotifier, HttpLoader, LinkList, LinkListStrategy, LoaderSettings, PageLoader,
    ParserWorker, RetryPolicy, SpellRecord, TwoStagePipeline, WorkerState,
};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    pipeline: TwoStagePipeline,
    lists: Arc<CollectingNotifier<LinkList>>,
    records: Arc<CollectingNotifier<SpellRecord>>,
}

fn harness(server: &MockServer, end_point: u32, extra: &str) -> Harness {
    let config = test_config(&server.uri(), end_point, extra);
    let loader: Arc<dyn PageLoader> = Arc::new(HttpLoader::new(&config.http).unwrap());
    let lists = Arc::new(CollectingNotifier::new());
    let records = Arc::new(CollectingNotifier::new());

    let pipeline =
        TwoStagePipeline::from_config(&config, loader, lists.clone(), records.clone()).unwrap();

    Harness {
        pipeline,
        lists,
        records,
    }
}

async fn mount_listing(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/spells/"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/spells/{}", slug)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_stage_harvest() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["/spells/alarm", "/spells/altered-strike"])).await;
    mount_listing(&server, "1", listing_page(&["/spells/aid"])).await;
    mount_detail(&server, "alarm", 200, ALARM).await;
    mount_detail(&server, "altered-strike", 200, ALTERED_STRIKE).await;
    mount_detail(&server, "aid", 503, "").await;

    let h = harness(&server, 1, "");
    let report = h.pipeline.run().await.unwrap();

    assert_eq!(report.listing.outcome, WorkerState::Completed);
    assert_eq!(report.links_found(), 2);
    assert_eq!(report.details.len(), 2);
    assert_eq!(report.records_emitted(), 2);
    assert_eq!(report.details[1].load_failures, 1);
    assert_eq!(report.details[1].load_attempts, 3);
    assert_eq!(report.pages_skipped(), 1);
    assert!(!report.is_aborted());

    let names: Vec<String> = h
        .records
        .records()
        .into_iter()
        .map(|(_, spell)| spell.name)
        .collect();
    assert_eq!(names, vec!["Alarm", "Altered Strike"]);

    let alarm = &h.records.records()[0].1;
    assert_eq!(alarm.level, 1);
    assert!(alarm.ritual);
    assert_eq!(alarm.source, "Adventurer's Guide");

    assert_eq!(
        h.lists.records()[0].1,
        vec!["/spells/alarm", "/spells/altered-strike"]
    );
    assert_eq!(h.lists.completions(), vec!["listing"]);
    assert_eq!(h.records.completions(), vec!["detail-1", "detail-2"]);
}

#[tokio::test]
async fn test_bounded_queue_preserves_order() {
    let server = MockServer::start().await;
    for page in 0..4 {
        mount_listing(&server, &page.to_string(), listing_page(&["/spells/alarm"])).await;
    }
    mount_detail(&server, "alarm", 200, ALARM).await;

    let h = harness(&server, 3, "[pipeline]\nqueue-capacity = 1");
    let report = h.pipeline.run().await.unwrap();

    assert_eq!(report.details.len(), 4);
    assert_eq!(report.records_emitted(), 4);
    let sources: Vec<String> = h.records.records().into_iter().map(|(s, _)| s).collect();
    assert_eq!(sources, vec!["detail-1", "detail-2", "detail-3", "detail-4"]);
}

#[tokio::test]
async fn test_detail_not_found_page_still_parsed() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["/spells/alarm"])).await;
    mount_detail(&server, "alarm", 404, ALARM).await;

    let h = harness(&server, 0, "");
    let report = h.pipeline.run().await.unwrap();

    assert_eq!(report.records_emitted(), 1);
    assert_eq!(h.records.records()[0].1.name, "Alarm");
}

#[tokio::test]
async fn test_abort_before_run_sends_no_requests() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["/spells/alarm"])).await;

    let h = harness(&server, 0, "");
    h.pipeline.handle().abort();
    let report = h.pipeline.run().await.unwrap();

    assert!(report.is_aborted());
    assert!(report.details.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(h.lists.completions(), vec!["listing"]);
}

#[tokio::test]
async fn test_parse_failure_abort_stops_both_stages() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["/spells/alarm", "/spells/aid"])).await;
    mount_detail(&server, "alarm", 200, "Service Unavailable").await;
    mount_detail(&server, "aid", 200, ALARM).await;

    let h = harness(&server, 0, "[pipeline]\nparse-failure = \"abort\"");
    let handle = h.pipeline.handle();
    let report = h.pipeline.run().await.unwrap();

    assert!(handle.is_aborted());
    assert!(report.is_aborted());
    assert_eq!(report.details.len(), 1);
    assert_eq!(report.details[0].document_failures, 1);
    assert!(h.records.is_empty());

    let aid_requests = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/spells/aid")
        .count();
    assert_eq!(aid_requests, 0);
}

#[tokio::test]
async fn test_parse_failure_skip_continues() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["/spells/alarm", "/spells/altered-strike"])).await;
    mount_detail(&server, "alarm", 200, "Service Unavailable").await;
    mount_detail(&server, "altered-strike", 200, ALTERED_STRIKE).await;

    let h = harness(&server, 0, "");
    let report = h.pipeline.run().await.unwrap();

    assert!(!report.is_aborted());
    assert_eq!(report.records_emitted(), 1);
    assert_eq!(report.pages_skipped(), 1);
}

#[tokio::test]
async fn test_listing_retries_transient_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spells/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spells/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SPELL_LIST))
        .mount(&server)
        .await;

    let loader = Arc::new(HttpLoader::new(&test_config(&server.uri(), 0, "").http).unwrap());
    let notifier = Arc::new(CollectingNotifier::<LinkList>::new());
    let settings =
        LoaderSettings::new(format!("{}/spells", server.uri()), "?page=", 0, 0, None).unwrap();

    let mut worker = ParserWorker::new(
        "listing",
        settings,
        Arc::new(LinkListStrategy::new("td.views-field-title a").unwrap()),
        loader,
        notifier.clone(),
    )
    .with_retry(RetryPolicy::immediate(5));

    let report = worker.start().await.unwrap();

    assert_eq!(report.outcome, WorkerState::Completed);
    assert_eq!(report.load_attempts, 3);
    assert_eq!(report.records_emitted, 1);

    let links = &notifier.records()[0].1;
    assert_eq!(links.len(), 50);
    assert_eq!(links[2], "/spells/alarm");
}

#[tokio::test]
async fn test_self_links_never_reach_detail_stage() {
    let server = MockServer::start().await;
    mount_listing(&server, "0", listing_page(&["", "#top", "/spells/alarm"])).await;
    mount_detail(&server, "alarm", 200, ALARM).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Home</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, 0, "");
    let report = h.pipeline.run().await.unwrap();

    assert_eq!(h.lists.records()[0].1, vec!["/spells/alarm"]);
    assert_eq!(report.records_emitted(), 1);
    assert_eq!(h.records.records()[0].1.name, "Alarm");
}
