//! Request objects handed to the messaging SDK
//!
//! Each builder encodes the payload and thumbnail up front, so a request that
//! reaches the transport is always complete. Transaction ids are unique within
//! the process and are what responses are correlated on.

use crate::compressor::compress;
use crate::constants::{AUTH_SCOPE, AUTH_STATE, IMAGE_DATA_MAX_KB, THUMB_SIZE};
use crate::error::Result;
use crate::thumbnail::{default_mini_program_thumbnail, share_thumbnail};
use image::DynamicImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TRANSACTION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Where a share lands in the messaging app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    /// A chat session; supports cards and mini-programs
    Session,
    /// The moments timeline
    Timeline,
    /// The user's favorites
    Favorite,
    /// A specific contact
    SpecifiedContact,
}

impl Scene {
    pub fn code(&self) -> i32 {
        match self {
            Scene::Session => 0,
            Scene::Timeline => 1,
            Scene::Favorite => 2,
            Scene::SpecifiedContact => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MiniProgramType {
    Release,
    Test,
    Preview,
}

impl MiniProgramType {
    pub fn code(&self) -> i32 {
        match self {
            MiniProgramType::Release => 0,
            MiniProgramType::Test => 1,
            MiniProgramType::Preview => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ThumbSize {
    fn default() -> Self {
        Self {
            width: THUMB_SIZE,
            height: THUMB_SIZE,
        }
    }
}

/// A URL-backed share with its card text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Link {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniProgram {
    pub program_type: MiniProgramType,
    /// Original id of the mini-program
    pub user_name: String,
    pub path: String,
    /// Fallback page for clients without mini-program support
    pub webpage_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaObject {
    Text {
        text: String,
    },
    Image {
        data: Vec<u8>,
    },
    Music {
        music_url: String,
    },
    Video {
        video_url: String,
    },
    WebPage {
        webpage_url: String,
    },
    MiniProgram {
        program: MiniProgram,
        with_share_ticket: bool,
    },
}

impl MediaObject {
    /// Prefix used for transaction ids of this kind of share
    pub fn kind(&self) -> &'static str {
        match self {
            MediaObject::Text { .. } => "text",
            MediaObject::Image { .. } => "img",
            MediaObject::Music { .. } => "music",
            MediaObject::Video { .. } => "video",
            MediaObject::WebPage { .. } => "webpage",
            MediaObject::MiniProgram { .. } => "miniprogram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMessage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumb_data: Option<Vec<u8>>,
    pub object: MediaObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub transaction: String,
    pub scene: Scene,
    pub message: MediaMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub transaction: String,
    pub scope: String,
    pub state: String,
}

/// Server-issued payment parameters, passed through unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentParams {
    pub app_id: String,
    pub partner_id: String,
    pub prepay_id: String,
    pub package_value: String,
    pub nonce_str: String,
    pub timestamp: String,
    pub sign: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub transaction: String,
    pub params: PaymentParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Share(ShareRequest),
    Auth(AuthRequest),
    Payment(PaymentRequest),
}

impl Request {
    pub fn transaction(&self) -> &str {
        match self {
            Request::Share(req) => &req.transaction,
            Request::Auth(req) => &req.transaction,
            Request::Payment(req) => &req.transaction,
        }
    }
}

impl From<ShareRequest> for Request {
    fn from(req: ShareRequest) -> Self {
        Request::Share(req)
    }
}

impl From<AuthRequest> for Request {
    fn from(req: AuthRequest) -> Self {
        Request::Auth(req)
    }
}

impl From<PaymentRequest> for Request {
    fn from(req: PaymentRequest) -> Self {
        Request::Payment(req)
    }
}

/// Builds `<prefix><millis>-<seq>`.
pub fn next_transaction(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = TRANSACTION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}{}-{}", prefix, millis, seq)
}

fn share_request(scene: Scene, message: MediaMessage) -> ShareRequest {
    ShareRequest {
        transaction: next_transaction(message.object.kind()),
        scene,
        message,
    }
}

fn link_message(object: MediaObject, link: Link, thumb_data: Vec<u8>) -> MediaMessage {
    MediaMessage {
        title: Some(link.title),
        description: Some(link.description),
        thumb_data: Some(thumb_data),
        object,
    }
}

pub fn share_text(content: impl Into<String>, scene: Scene) -> ShareRequest {
    let content = content.into();
    let message = MediaMessage {
        title: None,
        description: Some(content.clone()),
        thumb_data: None,
        object: MediaObject::Text { text: content },
    };
    share_request(scene, message)
}

/// Shares a full image plus a scaled thumbnail.
///
/// Images with an alpha channel are sent as PNG, opaque images as JPEG kept
/// under the SDK's image payload ceiling.
pub fn share_image(image: &DynamicImage, scene: Scene, thumb: ThumbSize) -> Result<ShareRequest> {
    let data = compress(image, IMAGE_DATA_MAX_KB, image.color().has_alpha())?;
    let thumb_data = share_thumbnail(image, thumb.width, thumb.height)?;
    let message = MediaMessage {
        title: None,
        description: None,
        thumb_data: Some(thumb_data),
        object: MediaObject::Image { data },
    };
    Ok(share_request(scene, message))
}

pub fn share_music(
    image: &DynamicImage,
    scene: Scene,
    link: Link,
    thumb: ThumbSize,
) -> Result<ShareRequest> {
    let thumb_data = share_thumbnail(image, thumb.width, thumb.height)?;
    let object = MediaObject::Music {
        music_url: link.url.clone(),
    };
    Ok(share_request(scene, link_message(object, link, thumb_data)))
}

pub fn share_video(
    image: &DynamicImage,
    scene: Scene,
    link: Link,
    thumb: ThumbSize,
) -> Result<ShareRequest> {
    let thumb_data = share_thumbnail(image, thumb.width, thumb.height)?;
    let object = MediaObject::Video {
        video_url: link.url.clone(),
    };
    Ok(share_request(scene, link_message(object, link, thumb_data)))
}

pub fn share_web_page(
    image: &DynamicImage,
    scene: Scene,
    link: Link,
    thumb: ThumbSize,
) -> Result<ShareRequest> {
    let thumb_data = share_thumbnail(image, thumb.width, thumb.height)?;
    let object = MediaObject::WebPage {
        webpage_url: link.url.clone(),
    };
    Ok(share_request(scene, link_message(object, link, thumb_data)))
}

/// Mini-program card. The thumbnail is a square crop kept under 128 KB.
pub fn share_mini_program(
    image: &DynamicImage,
    scene: Scene,
    program: MiniProgram,
    title: impl Into<String>,
    description: impl Into<String>,
) -> Result<ShareRequest> {
    let thumb_data = default_mini_program_thumbnail(image)?;
    let message = MediaMessage {
        title: Some(title.into()),
        description: Some(description.into()),
        thumb_data: Some(thumb_data),
        object: MediaObject::MiniProgram {
            program,
            with_share_ticket: true,
        },
    };
    Ok(share_request(scene, message))
}

pub fn auth_login() -> AuthRequest {
    AuthRequest {
        transaction: next_transaction("auth"),
        scope: AUTH_SCOPE.to_string(),
        state: AUTH_STATE.to_string(),
    }
}

pub fn payment(params: PaymentParams) -> PaymentRequest {
    PaymentRequest {
        transaction: next_transaction("pay"),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MINI_PROGRAM_THUMB_MAX_KB;
    use image::{GenericImageView, ImageFormat};
    use std::collections::HashSet;

    fn sample_program() -> MiniProgram {
        MiniProgram {
            program_type: MiniProgramType::Preview,
            user_name: "gh_d43f693ca31f".to_string(),
            path: "/pages/index".to_string(),
            webpage_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_scene_codes() {
        assert_eq!(Scene::Session.code(), 0);
        assert_eq!(Scene::Timeline.code(), 1);
        assert_eq!(Scene::Favorite.code(), 2);
        assert_eq!(Scene::SpecifiedContact.code(), 3);
        assert_eq!(MiniProgramType::Release.code(), 0);
        assert_eq!(MiniProgramType::Preview.code(), 2);
    }

    #[test]
    fn test_share_text() {
        let req = share_text("hello", Scene::Timeline);
        assert!(req.transaction.starts_with("text"));
        assert_eq!(req.scene, Scene::Timeline);
        assert_eq!(req.message.description.as_deref(), Some("hello"));
        assert_eq!(req.message.thumb_data, None);
        assert_eq!(
            req.message.object,
            MediaObject::Text {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_transactions_are_unique() {
        let ids: HashSet<String> = (0..100).map(|_| next_transaction("img")).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_share_image_opaque_uses_jpeg() {
        let img = DynamicImage::new_rgb8(320, 240);
        let req = share_image(&img, Scene::Session, ThumbSize::default()).unwrap();

        assert!(req.transaction.starts_with("img"));
        match &req.message.object {
            MediaObject::Image { data } => {
                assert_eq!(image::guess_format(data).unwrap(), ImageFormat::Jpeg);
            }
            other => panic!("unexpected object: {:?}", other),
        }
        let thumb = req.message.thumb_data.as_ref().unwrap();
        let decoded = image::load_from_memory(thumb).unwrap();
        assert_eq!(decoded.dimensions(), (150, 150));
    }

    #[test]
    fn test_share_image_transparent_uses_png() {
        let img = DynamicImage::new_rgba8(64, 64);
        let req = share_image(&img, Scene::Session, ThumbSize::default()).unwrap();
        match &req.message.object {
            MediaObject::Image { data } => {
                assert_eq!(image::guess_format(data).unwrap(), ImageFormat::Png);
            }
            other => panic!("unexpected object: {:?}", other),
        }
    }

    #[test]
    fn test_link_shares_carry_card_text() {
        let img = DynamicImage::new_rgb8(200, 200);
        let thumb = ThumbSize {
            width: 100,
            height: 80,
        };

        let music = share_music(
            &img,
            Scene::Session,
            Link::new("https://example.com/a.mp3", "Song", "An artist"),
            thumb,
        )
        .unwrap();
        assert!(music.transaction.starts_with("music"));
        assert_eq!(music.message.title.as_deref(), Some("Song"));
        assert_eq!(
            music.message.object,
            MediaObject::Music {
                music_url: "https://example.com/a.mp3".to_string()
            }
        );
        let decoded = image::load_from_memory(music.message.thumb_data.as_ref().unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), (100, 80));

        let video = share_video(
            &img,
            Scene::Favorite,
            Link::new("https://example.com/v", "Clip", "A clip"),
            thumb,
        )
        .unwrap();
        assert!(video.transaction.starts_with("video"));
        assert_eq!(video.scene, Scene::Favorite);

        let page = share_web_page(
            &img,
            Scene::Timeline,
            Link::new("https://example.com", "Page", "A page"),
            thumb,
        )
        .unwrap();
        assert!(page.transaction.starts_with("webpage"));
        assert_eq!(page.message.description.as_deref(), Some("A page"));
    }

    #[test]
    fn test_share_mini_program() {
        let img = DynamicImage::new_rgb8(600, 300);
        let req =
            share_mini_program(&img, Scene::Session, sample_program(), "Title", "Desc").unwrap();

        assert!(req.transaction.starts_with("miniprogram"));
        match &req.message.object {
            MediaObject::MiniProgram {
                program,
                with_share_ticket,
            } => {
                assert_eq!(program, &sample_program());
                assert!(*with_share_ticket);
            }
            other => panic!("unexpected object: {:?}", other),
        }
        let thumb = req.message.thumb_data.as_ref().unwrap();
        assert!(thumb.len() <= MINI_PROGRAM_THUMB_MAX_KB as usize * 1024);
        let decoded = image::load_from_memory(thumb).unwrap();
        assert_eq!(decoded.dimensions(), (300, 300));
    }

    #[test]
    fn test_share_with_empty_image_fails() {
        let img = DynamicImage::new_rgb8(0, 0);
        assert!(share_image(&img, Scene::Session, ThumbSize::default()).is_err());
        assert!(share_mini_program(&img, Scene::Session, sample_program(), "t", "d").is_err());
    }

    #[test]
    fn test_auth_and_payment_requests() {
        let auth = auth_login();
        assert!(auth.transaction.starts_with("auth"));
        assert_eq!(auth.scope, "snsapi_userinfo");

        let params = PaymentParams {
            app_id: "wx123".to_string(),
            partner_id: "1900000109".to_string(),
            prepay_id: "wx201410272009395522657a690389285100".to_string(),
            package_value: "Sign=WXPay".to_string(),
            nonce_str: "5K8264ILTKCH16CQ2502SI8ZNMTM67VS".to_string(),
            timestamp: "1412000000".to_string(),
            sign: "C380BEC2BFD727A4B6845133519F3AD6".to_string(),
        };
        let pay = payment(params.clone());
        assert!(pay.transaction.starts_with("pay"));
        assert_eq!(pay.params, params);

        let request: Request = pay.into();
        assert!(request.transaction().starts_with("pay"));
    }
}
