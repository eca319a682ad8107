// Profile analysis.
// Sums language bytes across a user's repositories and keeps the top five.

use futures::future::join_all;
use indexmap::IndexMap;

use crate::github::endpoints::{get_identity, get_languages, get_repos};
use crate::github::{AnalysisResult, Failure, LanguageBreakdown, LanguageBytes, Upstream};

/// Number of languages reported per profile.
pub const TOP_LANGUAGES: usize = 5;

/// Analyze the public repositories of `handle`.
///
/// The identity and repository-list calls must succeed. A repository whose
/// language breakdown cannot be fetched contributes nothing.
pub async fn analyze(upstream: &dyn Upstream, handle: &str) -> Result<AnalysisResult, Failure> {
    let identity = get_identity(upstream, handle).await?;
    let repos = get_repos(upstream, &identity.repos_url).await?;

    tracing::debug!(handle, repos = repos.len(), "fetching language breakdowns");

    let breakdowns = join_all(repos.iter().map(|repo| async move {
        match get_languages(upstream, &repo.languages_url).await {
            Ok(breakdown) => breakdown,
            Err(failure) => {
                tracing::debug!(
                    repo = %repo.name,
                    status = ?failure.status(),
                    error = failure.message(),
                    "skipping repository languages"
                );
                LanguageBreakdown::new()
            }
        }
    }))
    .await;

    Ok(AnalysisResult {
        login: identity.login,
        public_repos: identity.public_repos,
        top_languages: top_languages(&breakdowns, TOP_LANGUAGES),
    })
}

/// Sum bytes per language and return the `limit` largest.
///
/// Ties keep the order in which languages were first seen.
pub fn top_languages(breakdowns: &[LanguageBreakdown], limit: usize) -> Vec<LanguageBytes> {
    let mut tally: IndexMap<&str, u64> = IndexMap::new();
    for breakdown in breakdowns {
        for (lang, bytes) in breakdown {
            let total = tally.entry(lang.as_str()).or_insert(0);
            *total = total.saturating_add(*bytes);
        }
    }

    let mut ranked: Vec<(&str, u64)> = tally.into_iter().collect();
    // sort_by is stable, so equal totals stay in first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(lang, bytes)| LanguageBytes {
            lang: lang.to_string(),
            bytes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeUpstream;
    use serde_json::{Value, json};

    const REPOS_URL: &str = "https://api.github.com/users/octocat/repos";

    fn lang(lang: &str, bytes: u64) -> LanguageBytes {
        LanguageBytes {
            lang: lang.to_string(),
            bytes,
        }
    }

    fn repo(name: &str) -> Value {
        json!({
            "name": name,
            "languages_url": format!("https://api.github.com/repos/octocat/{}/languages", name),
        })
    }

    fn languages_path(name: &str) -> String {
        format!("https://api.github.com/repos/octocat/{}/languages", name)
    }

    fn octocat() -> FakeUpstream {
        FakeUpstream::new().ok(
            "/users/octocat",
            json!({ "login": "octocat", "public_repos": 3, "repos_url": REPOS_URL }),
        )
    }

    fn breakdown(pairs: &[(&str, u64)]) -> LanguageBreakdown {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn test_analyze_sums_across_repos() {
        let upstream = octocat()
            .ok(REPOS_URL, json!([repo("a"), repo("b"), repo("c")]))
            .ok(&languages_path("a"), json!({ "Go": 100 }))
            .ok(&languages_path("b"), json!({ "Go": 50, "Rust": 200 }))
            .ok(&languages_path("c"), json!({}));

        let result = analyze(&upstream, "octocat").await.unwrap();

        assert_eq!(result.login, "octocat");
        assert_eq!(result.public_repos, 3);
        assert_eq!(result.top_languages, vec![lang("Rust", 200), lang("Go", 150)]);
    }

    #[tokio::test]
    async fn test_analyze_tolerates_failing_repo() {
        let upstream = octocat()
            .ok(REPOS_URL, json!([repo("a"), repo("b"), repo("c")]))
            .ok(&languages_path("a"), json!({ "Go": 100 }))
            .status(&languages_path("b"), 403, &[])
            .unreachable(&languages_path("c"));

        let result = analyze(&upstream, "octocat").await.unwrap();

        assert_eq!(result.top_languages, vec![lang("Go", 100)]);
    }

    #[tokio::test]
    async fn test_analyze_short_circuits_on_identity_failure() {
        let upstream = FakeUpstream::new().status("/users/ghost", 404, &[]);

        let failure = analyze(&upstream, "ghost").await.unwrap_err();

        assert_eq!(failure.status(), Some(404));
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_short_circuits_on_repo_list_failure() {
        let upstream = octocat().status(REPOS_URL, 500, &[]);

        let failure = analyze(&upstream, "octocat").await.unwrap_err();

        assert_eq!(failure.status(), Some(500));
        assert_eq!(upstream.call_count(), 2);
    }

    #[tokio::test]
    async fn test_analyze_user_without_repos() {
        let upstream = octocat().ok(REPOS_URL, json!([]));

        let result = analyze(&upstream, "octocat").await.unwrap();

        assert!(result.top_languages.is_empty());
    }

    #[test]
    fn test_top_languages_keeps_five() {
        let breakdowns = vec![breakdown(&[
            ("A", 1),
            ("B", 2),
            ("C", 3),
            ("D", 4),
            ("E", 5),
            ("F", 6),
            ("G", 7),
        ])];

        let top = top_languages(&breakdowns, TOP_LANGUAGES);

        let names: Vec<&str> = top.iter().map(|l| l.lang.as_str()).collect();
        assert_eq!(names, vec!["G", "F", "E", "D", "C"]);
    }

    #[test]
    fn test_top_languages_ties_keep_first_seen_order() {
        let breakdowns = vec![
            breakdown(&[("Shell", 10), ("Python", 30)]),
            breakdown(&[("Go", 40), ("Shell", 30)]),
        ];

        let top = top_languages(&breakdowns, TOP_LANGUAGES);

        assert_eq!(
            top,
            vec![lang("Shell", 40), lang("Go", 40), lang("Python", 30)]
        );
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = AnalysisResult {
            login: "octocat".to_string(),
            public_repos: 2,
            top_languages: vec![lang("Rust", 200)],
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "login": "octocat",
                "publicRepos": 2,
                "topLanguages": [{ "lang": "Rust", "bytes": 200 }]
            })
        );
    }
}
