//! # screensight-web
//!
//! 화면 분석 HTTP 서버.
//! Axum 기반 JSON API로 [`VisionService`]의 세 작업을 노출한다.
//!
//! ## 엔드포인트
//! - `POST /ocr`: 영역 텍스트/색상 분석
//! - `POST /find_image`: 템플릿 위치 검색
//! - `POST /wait_for_text`: 정지 단어 출현 대기
//! - `GET /health`: 상태 확인

pub mod error;
pub mod handlers;
pub mod routes;

use axum::Router;
use screensight_core::config::ServerConfig;
use screensight_vision::service::VisionService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 화면 분석 서비스
    pub service: Arc<VisionService>,
}

impl AppState {
    pub fn new(service: Arc<VisionService>) -> Self {
        Self { service }
    }
}

/// 전체 라우터 구성 (CORS + 요청 로깅 포함)
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::api_routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 화면 분석 HTTP 서버
pub struct WebServer {
    config: ServerConfig,
    state: AppState,
}

impl WebServer {
    pub fn new(service: Arc<VisionService>, config: ServerConfig) -> Self {
        Self {
            config,
            state: AppState::new(service),
        }
    }

    fn host(&self) -> &'static str {
        if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    /// 서버 실행
    ///
    /// 설정 포트가 사용 중이면 다음 포트를 시도한다 (최대 10개).
    /// `shutdown_rx`에 `true`가 들어오면 진행 중인 요청을 마치고 종료한다.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = self.host();
        let base_port = self.config.port;
        let app = build_router(self.state);
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            let Some(port) = base_port.checked_add(attempt) else {
                break;
            };

            let addr: SocketAddr = match format!("{host}:{port}").parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{} ({})", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    info!("화면 분석 서버 시작: http://{}", addr);

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            loop {
                                if *shutdown_rx.borrow() {
                                    info!("웹 서버 종료 신호 수신");
                                    break;
                                }
                                if shutdown_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        })
                        .await?;

                    info!("화면 분석 서버 종료");
                    return Ok(());
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}

#[cfg(test)]
pub(crate) mod test_support;
