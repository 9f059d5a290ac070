//! Verify request building and the 401 retry against JSON vectors stored in
//! `test-vectors/`.
//!
//! Headers are compared as a lowercase name → value map, so the vectors do
//! not depend on header order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use admin_core::{
    ApiClient, ClientConfig, HttpMethod, HttpRequest, HttpResponse, RequestOptions, TransportError,
    API_KEY_HEADER,
};

fn client<T>(vectors: &serde_json::Value, case: &serde_json::Value, transport: T) -> ApiClient<T> {
    let mut config = ClientConfig::new(vectors["base_url"].as_str().unwrap());
    if let Some(key) = case["api_key"].as_str() {
        config = config.with_api_key(key);
    }
    ApiClient::new(config, transport)
}

fn method(case: &serde_json::Value) -> HttpMethod {
    case["method"].as_str().unwrap().parse().unwrap()
}

fn header_map(req: &HttpRequest) -> BTreeMap<String, String> {
    req.headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap().to_string()))
        .collect()
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/request.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let unused = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            unreachable!("request vectors only build requests")
        };
        let c = client(&vectors, case, unused);

        let mut options = RequestOptions::with_method(method(case));
        for pair in case["headers"].as_array().unwrap() {
            options = options.header(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
        }
        if let Some(body) = case["body"].as_str() {
            options = options.body(body);
        }

        let req = c.build_request(case["path"].as_str().unwrap(), options).unwrap();
        let expected = &case["expected_request"];
        assert_eq!(req.method.as_str(), expected["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: BTreeMap<String, String> =
            serde_json::from_value(expected["headers"].clone()).unwrap();
        assert_eq!(header_map(&req), expected_headers, "{name}: headers");
        assert_eq!(req.body.as_deref(), case["body"].as_str(), "{name}: body");
    }
}

#[test]
fn retry_test_vectors() {
    let raw = include_str!("../../test-vectors/retry.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let statuses: Vec<u16> = serde_json::from_value(case["statuses"].clone()).unwrap();
        let sent: Mutex<Vec<HttpRequest>> = Mutex::new(Vec::new());

        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            let mut sent = sent.lock().unwrap();
            let status = statuses[sent.len()];
            sent.push(req.clone());
            Ok(HttpResponse::new(status, ""))
        };
        let c = client(&vectors, case, transport);

        let mut options = RequestOptions::with_method(method(case));
        if !method(case).uses_query_credential() {
            options = options.body("{}");
        }
        let response = c.request(case["path"].as_str().unwrap(), options).unwrap();
        assert_eq!(
            u64::from(response.status),
            case["expected_status"].as_u64().unwrap(),
            "{name}: status"
        );

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent.len() as u64,
            case["expected_attempts"].as_u64().unwrap(),
            "{name}: attempts"
        );
        if let [first, retry] = sent.as_slice() {
            assert_eq!(retry.url, first.url, "{name}: retry keeps the url");
            assert_eq!(retry.body, first.body, "{name}: retry keeps the body");
            assert_eq!(
                retry.headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
                case["api_key"].as_str(),
                "{name}: retry carries the header"
            );
        }
    }
}
