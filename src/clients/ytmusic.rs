use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::clients::{
    catalog::{AddItemsStatus, DestinationCatalog, ResultType, SearchFilter, SearchResult},
    errors::{Error, Result},
    ytmusic_auth::{AuthState, OAuthToken, YtMusicAuth},
};

const BASE_URL: &str = "https://music.youtube.com/youtubei/v1";
const ORIGIN_URL: &str = "https://music.youtube.com";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.0) Gecko/20100101 Firefox/88.0";

// Search params narrowing results to a single category, spelling correction left on
const SONGS_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const VIDEOS_PARAMS: &str = "EgWKAQIQAWoMEA4QChADEAQQCRAF";

const SECTION_POINTERS: [&str; 2] = [
    "/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents",
    "/contents/sectionListRenderer/contents",
];
const VIDEO_ID_POINTERS: [&str; 2] = [
    "/playlistItemData/videoId",
    "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
];

impl SearchFilter {
    fn params(self) -> &'static str {
        match self {
            SearchFilter::Songs => SONGS_PARAMS,
            SearchFilter::Videos => VIDEOS_PARAMS,
        }
    }

    fn result_type(self) -> ResultType {
        match self {
            SearchFilter::Songs => ResultType::Song,
            SearchFilter::Videos => ResultType::Video,
        }
    }
}

fn client_context() -> Value {
    json!({
        "client": {
            "clientName": "WEB_REMIX",
            "clientVersion": format!("1.{}.01.00", Utc::now().format("%Y%m%d")),
            "hl": "en",
        },
        "user": {},
    })
}

/// Extracts ranked results from a filtered search response. Every result of a filtered
/// search belongs to the filter's category.
pub fn parse_search_results(
    response: &Value,
    filter: SearchFilter,
    limit: usize,
) -> Vec<SearchResult> {
    let Some(sections) = SECTION_POINTERS
        .iter()
        .find_map(|p| response.pointer(p))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    sections
        .iter()
        .filter_map(|section| section.pointer("/musicShelfRenderer/contents"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .map(|renderer| SearchResult {
            result_type: filter.result_type(),
            video_id: VIDEO_ID_POINTERS
                .iter()
                .find_map(|p| renderer.pointer(p))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .take(limit)
        .collect()
}

// Playlist ids returned by browse endpoints carry a "VL" prefix that edit endpoints reject
fn edit_playlist_id(playlist_id: &str) -> &str {
    playlist_id.strip_prefix("VL").unwrap_or(playlist_id)
}

pub struct YtMusicClient {
    http: reqwest::Client,
    auth: YtMusicAuth,
    token: Mutex<OAuthToken>,
}

impl YtMusicClient {
    /// Builds a client from stored credentials. Fails with `SetupRequired` when the
    /// credentials file does not exist yet.
    pub async fn connect(auth: YtMusicAuth) -> Result<Self> {
        match auth.state().await {
            AuthState::SetupRequired => return Err(Error::SetupRequired(auth.path().to_path_buf())),
            AuthState::Unreadable(err) => return Err(err),
            AuthState::Authenticated(_) => {}
        }
        let token = auth.valid_token().await?;
        Ok(YtMusicClient {
            http: reqwest::Client::new(),
            auth,
            token: Mutex::new(token),
        })
    }

    async fn headers(&self) -> Result<HeaderMap> {
        let mut token = self.token.lock().await;
        if token.is_expiring(Utc::now().timestamp()) {
            *token = self.auth.valid_token().await?;
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static(ORIGIN_URL));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization_header())
                .map_err(|e| Error::YtMusicAuthError(e.to_string()))?,
        );
        Ok(headers)
    }

    async fn send_request(&self, endpoint: &str, mut body: Value) -> Result<Value> {
        body["context"] = client_context();
        let url = format!("{BASE_URL}/{endpoint}");
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .headers(self.headers().await?)
            .query(&[("alt", "json")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::YtMusicUnexpectedResponse(format!(
                "{endpoint} returned {status}: {text}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DestinationCatalog for YtMusicClient {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String> {
        let body = json!({
            "title": title,
            "description": description,
            "privacyStatus": "PRIVATE",
        });
        let response = self.send_request("playlist/create", body).await?;
        response
            .get("playlistId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::YtMusicUnexpectedResponse(format!(
                    "playlist/create response without playlistId: {response}"
                ))
            })
    }

    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let body = json!({ "query": query, "params": filter.params() });
        let response = self.send_request("search", body).await?;
        Ok(parse_search_results(&response, filter, limit))
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        video_ids: &[String],
    ) -> Result<AddItemsStatus> {
        let actions: Vec<Value> = video_ids
            .iter()
            .map(|id| {
                json!({
                    "action": "ACTION_ADD_VIDEO",
                    "addedVideoId": id,
                    "dedupeOption": "DEDUPE_OPTION_SKIP",
                })
            })
            .collect();
        let body = json!({
            "playlistId": edit_playlist_id(playlist_id),
            "actions": actions,
        });
        let response = self.send_request("browse/edit_playlist", body).await?;
        Ok(AddItemsStatus {
            status: response
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
            response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(video_id: Option<&str>) -> Value {
        match video_id {
            Some(id) => json!({"musicResponsiveListItemRenderer": {"playlistItemData": {"videoId": id}}}),
            None => json!({"musicResponsiveListItemRenderer": {"flexColumns": []}}),
        }
    }

    fn tabbed_response(items: Vec<Value>) -> Value {
        json!({
            "contents": {"tabbedSearchResultsRenderer": {"tabs": [{"tabRenderer": {"content": {
                "sectionListRenderer": {"contents": [
                    {"itemSectionRenderer": {"contents": []}},
                    {"musicShelfRenderer": {"contents": items}}
                ]}
            }}}]}}
        })
    }

    #[test]
    fn parses_song_results_in_rank_order() {
        let response = tabbed_response(vec![item(Some("a1")), item(None), item(Some("b2"))]);
        let results = parse_search_results(&response, SearchFilter::Songs, 5);
        assert_eq!(
            results,
            vec![
                SearchResult::song("a1"),
                SearchResult {
                    result_type: ResultType::Song,
                    video_id: None
                },
                SearchResult::song("b2"),
            ]
        );
    }

    #[test]
    fn truncates_to_limit() {
        let items = (0..8).map(|i| item(Some(&format!("v{i}")))).collect();
        let results = parse_search_results(&tabbed_response(items), SearchFilter::Videos, 5);
        assert_eq!(results.len(), 5);
        assert_eq!(results[0], SearchResult::video("v0"));
    }

    #[test]
    fn reads_video_id_from_play_button_overlay() {
        let overlay = json!({"musicResponsiveListItemRenderer": {"overlay": {
            "musicItemThumbnailOverlayRenderer": {"content": {"musicPlayButtonRenderer": {
                "playNavigationEndpoint": {"watchEndpoint": {"videoId": "xyz"}}
            }}}
        }}});
        let response = json!({"contents": {"sectionListRenderer": {"contents": [
            {"musicShelfRenderer": {"contents": [overlay]}}
        ]}}});
        let results = parse_search_results(&response, SearchFilter::Videos, 5);
        assert_eq!(results, vec![SearchResult::video("xyz")]);
    }

    #[test]
    fn empty_response_yields_no_results() {
        assert!(parse_search_results(&json!({}), SearchFilter::Songs, 5).is_empty());
    }

    #[test]
    fn strips_browse_prefix_from_playlist_id() {
        assert_eq!(edit_playlist_id("VLPL123"), "PL123");
        assert_eq!(edit_playlist_id("PL123"), "PL123");
    }
}
