//! Integration tests for fetching and scraping
//!
//! These tests use wiremock to stand in for the news portal and exercise the
//! fetch, extract and write path end to end.

use std::time::Duration;
use thnews_scraper::scrapers::fetch::fetch_index_source;
use thnews_scraper::{
    FetchMode, ScrapeError, SiteConfig, build_http_client, parse_article, scrape_index,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PATH: &str = "/publish/thunews/9648/index.html";

const INDEX_PAGE: &str = r#"<html><body><ul>
  <li class="clearfix">
    <img src="/publish/thunews/9648/20161125111440926399642/a.jpg">
    <a class="jiequ" href="/publish/thunews/9648/2016/20161125111440926399642/20161125111440926399642_.html">石墨烯</a>
    <div class="contentwraper"><p><script>cutSummary("摘要一",180);</script></p></div>
    <font class="dd"><script>fmtDate("2016.11.25");</script></font>
  </li>
  <li class="clearfix">
    <img src="/publish/thunews/9648/20161124093015462840135/b.jpg">
    <a class="jiequ" href="/publish/thunews/9648/2016/20161124093015462840135/20161124093015462840135_.html">校庆</a>
    <div class="contentwraper"><p><script>cutSummary("摘要二",180);</script></p></div>
    <font class="dd"><script>fmtDate("2016.11.24");</script></font>
  </li>
  <li class="clearfix">
    <img src="/publish/thunews/9648/20161122202918632829820/c.jpg">
    <a class="jiequ" href="/publish/thunews/9648/2016/20161122202918632829820/20161122202918632829820_.html">讲座</a>
    <div class="contentwraper"><p><script>cutSummary("摘要三",180);</script></p></div>
    <font class="dd"><script>fmtDate("2016.11.22");</script></font>
  </li>
</ul></body></html>"#;

const ARTICLE_PAGE: &str = r#"<html><body><article class="article">
  <p>清华新闻网11月25日电</p>
  <p style="text-align: center"><img src="/publish/thunews/images/fig1.jpg"></p>
  <p style="text-align: center">图1</p>
  <p style="text-align: right">供稿：航天航空学院编辑：李华丹 赵姝婧</p>
</article></body></html>"#;

fn site(server: &MockServer, timeout: Duration) -> SiteConfig {
    SiteConfig::new(&server.uri(), INDEX_PATH, timeout).expect("valid mock origin")
}

#[tokio::test]
async fn test_scrape_index_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_secs(5));

    let columns = scrape_index(&client, &config, FetchMode::Requests, dir.path())
        .await
        .unwrap();

    assert_eq!(columns.len(), 3);
    assert_eq!(columns.titles, vec!["石墨烯", "校庆", "讲座"]);
    assert_eq!(columns.dates, vec!["2016.11.25", "2016.11.24", "2016.11.22"]);
    assert_eq!(
        columns.urls[0],
        format!(
            "{}/publish/thunews/9648/2016/20161125111440926399642/20161125111440926399642_.html",
            server.uri()
        )
    );

    let contents = std::fs::read_to_string(dir.path().join("thNewsRequests.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "title,url,summary,date,pic,writetime");
    assert!(lines[1].starts_with("石墨烯,"));
}

#[tokio::test]
async fn test_index_timeout_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(INDEX_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_PAGE))
        .mount(&server)
        .await;

    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_millis(300));

    let source = fetch_index_source(&client, &config).await.unwrap();
    assert!(source.contains("cutSummary"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_index_second_timeout_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(INDEX_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_millis(300));

    let err = fetch_index_source(&client, &config).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Timeout { .. }), "got {err:?}");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_connection_failure_not_retried() {
    // Nothing listens on the port once the listener is dropped.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let client = build_http_client().unwrap();
    let config = SiteConfig::new(&uri, INDEX_PATH, Duration::from_secs(5)).unwrap();

    let err = fetch_index_source(&client, &config).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Http { .. }), "got {err:?}");
    assert!(!err.is_malformed());
}

#[tokio::test]
async fn test_parse_article_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/publish/thunews/9648/2016/a_.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_PAGE))
        .mount(&server)
        .await;

    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_secs(5));
    let url = format!("{}/publish/thunews/9648/2016/a_.html", server.uri());

    let article = parse_article(&client, &config, &url).await.unwrap();
    assert_eq!(article.article_text, "清华新闻网11月25日电");
    assert_eq!(article.editors, vec!["李华丹", "赵姝婧"]);
    assert_eq!(article.provider.as_deref(), Some("航天航空学院"));
    assert_eq!(article.images.len(), 1);
    assert_eq!(
        article.images[0].url,
        format!("{}/publish/thunews/images/fig1.jpg", server.uri())
    );
    assert_eq!(article.images[0].caption, "图1");
    assert_eq!(article.paper_link, None);
    assert_eq!(article.ref_links, None);
}

#[tokio::test]
async fn test_malformed_article_is_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body><article class="article"><p>无编辑</p></article></body></html>"#,
                ),
        )
        .mount(&server)
        .await;

    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_secs(5));
    let err = parse_article(&client, &config, &format!("{}/x.html", server.uri()))
        .await
        .unwrap_err();
    assert!(err.is_malformed(), "got {err:?}");
}

#[tokio::test]
async fn test_parse_article_honours_declared_charset() {
    // `<p style="text-align: right">编辑：张三</p>` encoded as GBK.
    let editor_line: [u8; 43] = [
        60, 112, 32, 115, 116, 121, 108, 101, 61, 34, 116, 101, 120, 116, 45, 97, 108, 105, 103,
        110, 58, 32, 114, 105, 103, 104, 116, 34, 62, 177, 224, 188, 173, 163, 186, 213, 197, 200,
        253, 60, 47, 112, 62,
    ];
    let mut body = br#"<html><body><article class="article"><p>news</p>"#.to_vec();
    body.extend_from_slice(&editor_line);
    body.extend_from_slice(b"</article></body></html>");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/publish/thunews/9648/2012/gbk_.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=gbk"))
        .mount(&server)
        .await;

    let client = build_http_client().unwrap();
    let config = site(&server, Duration::from_secs(5));
    let url = format!("{}/publish/thunews/9648/2012/gbk_.html", server.uri());

    let article = parse_article(&client, &config, &url).await.unwrap();
    assert_eq!(article.editors, vec!["张三"]);
}
