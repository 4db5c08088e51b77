use serde::{Deserialize, Serialize};

/// A single hydrant record — the only persistent entity.
///
/// `x_coord`/`y_coord` are base-image pixel coordinates (see [`crate::map`]).
/// The two image paths are root-relative URLs to the derived variants of one
/// uploaded photo; they are produced together at creation and never
/// regenerated. Only the coordinates are mutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hydrant {
    pub id: i64,
    pub x_coord: f64,
    pub y_coord: f64,
    pub image_large_path: String,
    pub image_thumb_path: String,
    pub created_at: String,
}

/// Coordinate payload for move requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordsUpdate {
    pub x_coord: f64,
    pub y_coord: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydrant_json_shape() {
        let h = Hydrant {
            id: 3,
            x_coord: 100.5,
            y_coord: 200.25,
            image_large_path: "/uploads/large-1700000000000-pump.jpg".to_string(),
            image_thumb_path: "/uploads/thumb-1700000000000-pump.jpg".to_string(),
            created_at: "2024-11-14T22:13:20Z".to_string(),
        };
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["x_coord"], 100.5);
        assert_eq!(json["y_coord"], 200.25);
        assert_eq!(json["image_large_path"], "/uploads/large-1700000000000-pump.jpg");
        assert_eq!(json["image_thumb_path"], "/uploads/thumb-1700000000000-pump.jpg");
        assert_eq!(json["created_at"], "2024-11-14T22:13:20Z");
    }

    #[test]
    fn test_hydrant_roundtrip() {
        let json = r#"{"id":1,"x_coord":12.0,"y_coord":34.0,"image_large_path":"/uploads/large-a.png","image_thumb_path":"/uploads/thumb-a.png","created_at":"2024-01-01T00:00:00Z"}"#;
        let h: Hydrant = serde_json::from_str(json).unwrap();
        assert_eq!(h.id, 1);
        assert_eq!(h.x_coord, 12.0);
        assert_eq!(serde_json::to_string(&h).unwrap(), json);
    }

    #[test]
    fn test_coords_update_deserializes() {
        let c: CoordsUpdate = serde_json::from_str(r#"{"x_coord":1.5,"y_coord":-2.0}"#).unwrap();
        assert_eq!(c.x_coord, 1.5);
        assert_eq!(c.y_coord, -2.0);
    }
}
