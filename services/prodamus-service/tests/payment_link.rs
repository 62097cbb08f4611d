use bigdecimal::BigDecimal;
use hmac::{Hmac, Mac};
use prodamus_service::{
    request::build_link, Customer, MerchantCredentials, PaymentRequest, ReceiptItem,
};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::str::FromStr;

fn hmac_hex(secret: &str, msg: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(msg.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn query_pairs(url: &str) -> BTreeMap<String, String> {
    let (_, query) = url.split_once('?').expect("query string");
    query
        .split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect()
}

fn scenario_request() -> PaymentRequest {
    PaymentRequest {
        order_id: "A100".into(),
        amount: BigDecimal::from_str("250.00").unwrap(),
        currency: "RUB".into(),
        success_url: "https://ok".into(),
        fail_url: "https://fail".into(),
        description: String::new(),
        customer: Customer { phone: None, email: Some("x@y.com".into()) },
        items: vec![ReceiptItem::new("Widget", BigDecimal::from_str("250.00").unwrap(), 1)],
    }
}

#[test]
fn link_carries_documented_fields_and_independent_signature() {
    let creds = MerchantCredentials::new("https://pay.example/ui", "shop1", "s3cr3t", "");
    let url = build_link(&scenario_request(), &creds).unwrap();
    assert!(url.starts_with("https://pay.example/ui?"));

    let pairs = query_pairs(&url);
    let expected_keys = [
        "customer_email",
        "customer_extra",
        "customer_phone",
        "do",
        "order_id",
        "products[0][name]",
        "products[0][price]",
        "products[0][quantity]",
        "products[0][sku]",
        "signature",
        "sys",
        "urlNotification",
        "urlReturn",
        "urlSuccess",
    ];
    let keys: Vec<&str> = pairs.keys().map(String::as_str).collect();
    assert_eq!(keys, expected_keys);
    assert_eq!(pairs["order_id"], "A100");
    assert_eq!(pairs["customer_email"], "x@y.com");
    assert_eq!(pairs["do"], "link");
    assert_eq!(pairs["sys"], "shop1");
    assert_eq!(pairs["urlSuccess"], "https://ok");
    assert_eq!(pairs["urlReturn"], "https://fail");
    assert_eq!(pairs["products[0][price]"], "250.00");

    let canonical = "customer_email:x@y.com;customer_extra:;customer_phone:;do:link;order_id:A100;\
products:[name:Widget;price:250.00;quantity:1;sku:;];sys:shop1;urlNotification:;\
urlReturn:https://fail;urlSuccess:https://ok;";
    assert_eq!(pairs["signature"], hmac_hex("s3cr3t", canonical));
}

#[test]
fn changing_a_field_changes_the_signature() {
    let creds = MerchantCredentials::new("https://pay.example/ui", "shop1", "s3cr3t", "");
    let mut a = scenario_request();
    a.items[0].price = BigDecimal::from(10);
    let mut b = scenario_request();
    b.items[0].price = BigDecimal::from(100);
    let sa = query_pairs(&build_link(&a, &creds).unwrap())["signature"].clone();
    let sb = query_pairs(&build_link(&b, &creds).unwrap())["signature"].clone();
    assert_ne!(sa, sb);
}

#[test]
fn missing_secret_is_configuration_error() {
    let creds = MerchantCredentials::new("https://pay.example/ui", "shop1", "", "");
    let err = build_link(&scenario_request(), &creds).unwrap_err();
    assert!(matches!(err, prodamus_service::GatewayError::Configuration(_)));
}
