use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

pub mod models;

use models::{CreateGameRequest, ErrorBody, PlayersResponse};

use crate::models::Player;

/// Base URL the admin tooling talks to when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Everything that can go wrong while talking to the game backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, reset, invalid body...).
    #[error("could not reach the game backend: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered, but not with a 2xx.
    #[error("game backend answered with status {status}{}", describe(.message))]
    HttpStatus {
        status: StatusCode,
        message: Option<String>,
    },
    /// A 2xx answer whose body did not have the expected shape.
    #[error("game backend sent an unexpected body: {0}")]
    MalformedResponse(String),
}

fn describe(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|message| format!(": {}", message))
        .unwrap_or_default()
}

impl ApiError {
    /// Build an error out of a non-success response, keeping the backend's own explanation if
    /// it sent one.
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.error);

        ApiError::HttpStatus { status, message }
    }
}

/// Describes the backend the recorder reads players from and writes games to.
///
/// The HTTP implementation is the only one used at runtime; tests provide their own.
#[allow(async_fn_in_trait)]
pub trait RecorderApi {
    /// Retrieves every registered player. A missing or null list is an empty list.
    async fn get_players(&self) -> Result<Vec<Player>, ApiError>;

    /// Stores a finished game. The response body is ignored.
    async fn create_game(&self, request: &CreateGameRequest) -> Result<(), ApiError>;
}

/// The API endpoint to retrieve resources from.
#[derive(Debug, Clone)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Append a path such as `players` to the base URL.
    fn append_path(&self, path: &str) -> String {
        format!("{}/{}", self.url, path)
    }
}

/// The game backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRecorderApi {
    /// The reqwest client used for every request.
    client: Client,
    /// Where the backend lives, e.g. `http://localhost:8080/api`.
    endpoint: Endpoint,
}

impl HttpRecorderApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: Endpoint::new(base_url),
        }
    }
}

impl RecorderApi for HttpRecorderApi {
    #[instrument(skip(self), fields(endpoint = %self.endpoint.url))]
    async fn get_players(&self) -> Result<Vec<Player>, ApiError> {
        let response = self
            .client
            .get(self.endpoint.append_path("players"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let body = response.bytes().await?;
        let players: PlayersResponse = serde_json::from_slice(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let players = players.players.unwrap_or_default();

        debug!("Fetched {} players", players.len());

        Ok(players)
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint.url, winner = %request.winner))]
    async fn create_game(&self, request: &CreateGameRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint.append_path("games"))
            .json(request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                debug!("Game stored with status {}", status);
                Ok(())
            }
            _ => Err(ApiError::from_response(response).await),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::models::GamePlayerInput;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answers exactly one HTTP request with the given status line and body, then hands back
    /// the raw request it received.
    pub(crate) async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    pub(crate) fn local_api(base_url: &str) -> HttpRecorderApi {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpRecorderApi::with_client(base_url, client)
    }

    fn sample_request() -> CreateGameRequest {
        CreateGameRequest {
            radiant_players: vec![GamePlayerInput {
                id: Some("p1".to_string()),
                nickname: None,
                role: "carry".to_string(),
                is_captain: true,
            }],
            dire_players: vec![],
            winner: "DIRE".to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn endpoint_joins_paths_without_double_slashes() {
        let endpoint = Endpoint::new("http://localhost:8080/api/");
        assert_eq!(
            endpoint.append_path("players"),
            "http://localhost:8080/api/players"
        );
    }

    #[tokio::test]
    async fn fetches_players() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"players":[{"id":"p1","nickname":"Alice","games":2},{"id":"p2","nickname":"Bob"}]}"#,
        )
        .await;

        let players = local_api(&base_url).get_players().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/players "));
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].nickname, "Alice");
        assert_eq!(players[0].games, Some(2));
        assert_eq!(players[1].games, None);
    }

    #[tokio::test]
    async fn null_player_list_is_empty() {
        let (base_url, server) = serve_once("200 OK", r#"{"players":null}"#).await;

        let players = local_api(&base_url).get_players().await.unwrap();
        server.await.unwrap();

        assert!(players.is_empty());
    }

    #[tokio::test]
    async fn non_json_player_list_is_malformed() {
        let (base_url, server) = serve_once("200 OK", "<html></html>").await;

        let result = local_api(&base_url).get_players().await;
        server.await.unwrap();

        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn posts_games_as_json() {
        let (base_url, server) =
            serve_once("201 Created", r#"{"message":"game created successfully"}"#).await;

        local_api(&base_url)
            .create_game(&sample_request())
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /api/games "));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({
                "radiant_players": [{"id": "p1", "role": "carry", "is_captain": true}],
                "dire_players": [],
                "winner": "DIRE"
            })
        );
    }

    #[tokio::test]
    async fn failed_post_keeps_backend_message() {
        let (base_url, server) = serve_once(
            "400 Bad Request",
            r#"{"error":"each team must have exactly 5 players"}"#,
        )
        .await;

        let result = local_api(&base_url).create_game(&sample_request()).await;
        server.await.unwrap();

        match result {
            Err(ApiError::HttpStatus { status, message }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(
                    message.as_deref(),
                    Some("each team must have exactly 5 players")
                );
            }
            other => panic!("expected an HTTP status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_errors_without_body_have_no_message() {
        let (base_url, server) = serve_once("500 Internal Server Error", "").await;

        let result = local_api(&base_url).create_game(&sample_request()).await;
        server.await.unwrap();

        assert!(matches!(
            result,
            Err(ApiError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: None
            })
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let result = local_api(&base_url).get_players().await;

        assert!(matches!(result, Err(ApiError::Network(_))));
    }
}
