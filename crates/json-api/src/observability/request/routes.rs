//! Route templates for span and metric labels.

use uuid::Uuid;

/// Replace identifier segments so every product or category shares one label.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut template = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            template.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            template.push_str("{uuid}");
        } else {
            template.push_str(segment);
        }
    }

    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_segments_are_replaced() {
        let path = format!("/categories/{}/products", Uuid::nil());

        assert_eq!(route_template(&path), "/categories/{uuid}/products");
    }

    #[test]
    fn test_static_paths_are_kept() {
        assert_eq!(route_template("/products/import"), "/products/import");
        assert_eq!(route_template("/"), "/");
    }
}
