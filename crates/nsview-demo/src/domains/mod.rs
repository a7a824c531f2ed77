//! Example domains. Each one contributes a `views/` tree during setup and,
//! where it serves pages of its own, a router once the renderer is built.

pub mod app;
pub mod quotes;

/// URL of `page` under the base path: `("/", "quote")` → `/quote`,
/// `("/app", "quote")` → `/app/quote`.
pub(crate) fn page_path(base_path: &str, page: &str) -> String {
    format!("{}/{page}", base_path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path() {
        assert_eq!(page_path("/", "quote"), "/quote");
        assert_eq!(page_path("/app", "quote"), "/app/quote");
    }
}
