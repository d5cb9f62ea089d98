//! Web Thing description for the photo cycler.
//!
//! Generic Web Thing controllers read this document to discover which
//! properties the device has and where to read or write them.
//! See: <https://webthings.io/api/>

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{CURRENT_IMAGE_HREF, IMAGE_MEDIA_TYPE, UI_HREF};

/// Thing identifier
pub const THING_ID: &str = "urn:dev:ops:photo-cycler";

/// Thing title
pub const THING_TITLE: &str = "Photo Cycler";

/// Read-write refresh interval property
pub const UPDATE_RATE_PROPERTY: &str = "updateRate";

/// Read-only current image property
pub const IMAGE_PROPERTY: &str = "image";

/// How the `image` property is presented to clients.
///
/// The property value itself is always `null`; clients fetch the picture
/// from `href`, which is served from the managed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Link relation ("alternate")
    pub rel: &'static str,
    /// Where the current image is served
    pub href: &'static str,
    /// Always "image/jpeg"
    pub media_type: &'static str,
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        Self {
            rel: "alternate",
            href: CURRENT_IMAGE_HREF,
            media_type: IMAGE_MEDIA_TYPE,
        }
    }
}

fn property_href(name: &str) -> String {
    format!("/properties/{}", name)
}

/// Property metadata keyed by property name.
pub fn property_descriptions() -> Map<String, Value> {
    let mut properties = Map::new();

    properties.insert(
        UPDATE_RATE_PROPERTY.to_string(),
        json!({
            "type": "number",
            "description": "Photo cycle rate",
            "minimum": 0,
            "unit": "second",
            "title": "Update Rate",
            "links": [
                { "rel": "property", "href": property_href(UPDATE_RATE_PROPERTY) },
            ],
        }),
    );

    let image = ImageDescriptor::default();
    properties.insert(
        IMAGE_PROPERTY.to_string(),
        json!({
            "@type": "ImageProperty",
            "type": "null",
            "description": "Current image",
            "title": "Image",
            "readOnly": true,
            "links": [
                { "rel": "property", "href": property_href(IMAGE_PROPERTY) },
                image,
            ],
        }),
    );

    properties
}

/// The full thing description served at `/`.
pub fn thing_description() -> Value {
    json!({
        "id": THING_ID,
        "title": THING_TITLE,
        "@context": "https://webthings.io/schemas",
        "@type": [],
        "description": THING_TITLE,
        "properties": property_descriptions(),
        "actions": {},
        "events": {},
        "links": [
            { "rel": "properties", "href": "/properties" },
            { "rel": "alternate", "mediaType": "text/html", "href": UI_HREF },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rate_description() {
        let props = property_descriptions();
        let rate = &props[UPDATE_RATE_PROPERTY];
        assert_eq!(rate["type"], "number");
        assert_eq!(rate["minimum"], 0);
        assert_eq!(rate["unit"], "second");
        assert!(rate.get("readOnly").is_none());
    }

    #[test]
    fn test_image_description() {
        let props = property_descriptions();
        let image = &props[IMAGE_PROPERTY];
        assert_eq!(image["@type"], "ImageProperty");
        assert_eq!(image["type"], "null");
        assert_eq!(image["readOnly"], true);

        let alternate = image["links"]
            .as_array()
            .unwrap()
            .iter()
            .find(|l| l["rel"] == "alternate")
            .unwrap();
        assert_eq!(alternate["href"], "/static/current.jpg");
        assert_eq!(alternate["mediaType"], "image/jpeg");
    }

    #[test]
    fn test_thing_description() {
        let td = thing_description();
        assert_eq!(td["id"], THING_ID);
        assert_eq!(td["title"], "Photo Cycler");
        assert!(td["properties"].get(UPDATE_RATE_PROPERTY).is_some());
        assert!(td["properties"].get(IMAGE_PROPERTY).is_some());
        assert!(td["links"]
            .as_array()
            .unwrap()
            .iter()
            .any(|l| l["href"] == "/static/index.html"));
    }
}
