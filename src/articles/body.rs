//! Request body decoding for article writes.
//!
//! Nothing here rejects a request. A body in an unknown format, or one that
//! fails to decode, yields empty fields and the write proceeds with them.

use serde_json::{Map, Value};
use tracing::debug;

use crate::model::ArticleFields;
use crate::request::Request;

/// Decodes `title` and `content` from a form-encoded or JSON body.
pub(crate) fn decode_fields(req: &Request) -> ArticleFields {
    let Some(content_type) = req.header("content-type") else {
        return ArticleFields::default();
    };
    let Ok(mime) = content_type.parse::<mime::Mime>() else {
        debug!(content_type, "unparseable content type, ignoring body");
        return ArticleFields::default();
    };

    if mime.type_() != mime::APPLICATION {
        return ArticleFields::default();
    }
    if mime.subtype() == mime::WWW_FORM_URLENCODED {
        from_form(req.body())
    } else if mime.subtype() == mime::JSON || mime.suffix().is_some_and(|s| s == mime::JSON) {
        from_json(req.body())
    } else {
        ArticleFields::default()
    }
}

/// Later occurrences of a key win.
fn from_form(body: &[u8]) -> ArticleFields {
    let mut fields = ArticleFields::default();
    for (key, value) in form_urlencoded::parse(body) {
        match key.as_ref() {
            "title" => fields.title = Some(value.into_owned()),
            "content" => fields.content = Some(value.into_owned()),
            _ => {}
        }
    }
    fields
}

/// Only string values are taken; anything else leaves the field absent.
fn from_json(body: &[u8]) -> ArticleFields {
    let object: Map<String, Value> = match serde_json::from_slice(body) {
        Ok(object) => object,
        Err(e) => {
            debug!("body is not a JSON object, ignoring it: {e}");
            return ArticleFields::default();
        }
    };
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_owned);
    ArticleFields {
        title: text("title"),
        content: text("content"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;
    use http::HeaderMap;

    use super::*;
    use crate::method::Method;

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type", ct.parse().unwrap());
        }
        Request::new(
            Method::Post,
            "/articles".to_owned(),
            headers,
            Bytes::copy_from_slice(body.as_bytes()),
            HashMap::new(),
        )
    }

    #[test]
    fn form_bodies_decode() {
        let req = request(
            Some("application/x-www-form-urlencoded"),
            "title=Cats+Rule&content=Cats%20are%20great&extra=1",
        );
        assert_eq!(decode_fields(&req), ArticleFields::new("Cats Rule", "Cats are great"));
    }

    #[test]
    fn repeated_form_keys_take_the_last_value() {
        let req = request(Some("application/x-www-form-urlencoded"), "title=a&title=b");
        assert_eq!(decode_fields(&req).title.as_deref(), Some("b"));
    }

    #[test]
    fn json_bodies_decode() {
        let req = request(
            Some("application/json; charset=utf-8"),
            r#"{"content":"Cats are the best","views":3}"#,
        );
        assert_eq!(decode_fields(&req), ArticleFields::content_only("Cats are the best"));
    }

    #[test]
    fn non_string_json_values_are_ignored() {
        let req = request(Some("application/json"), r#"{"title":42,"content":null}"#);
        assert_eq!(decode_fields(&req), ArticleFields::default());
    }

    #[test]
    fn malformed_or_unknown_bodies_yield_empty_fields() {
        for (ct, body) in [
            (Some("application/json"), "{not json"),
            (Some("application/json"), r#"["title"]"#),
            (Some("text/plain"), "title=Cats"),
            (Some("not a mime"), "title=Cats"),
            (None, "title=Cats"),
        ] {
            assert_eq!(decode_fields(&request(ct, body)), ArticleFields::default(), "{ct:?}");
        }
    }
}
