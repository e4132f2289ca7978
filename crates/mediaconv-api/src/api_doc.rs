//! OpenAPI documentation, served as JSON at `/api/openapi.json` and rendered by RapiDoc at
//! `/docs`.

use utoipa::OpenApi;

use crate::handlers;
use crate::setup::routes::health;
use mediaconv_core::models;
use mediaconv_infra::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mediaconv API",
        version = "0.1.0",
        description = "Converts uploaded images (JPEG, PNG, GIF, WebP, BMP, TIFF, SVG) to jpeg, png, webp, gif or tiff, and audio files to mp3, wav, ogg, m4a, aac or flac. Converted files are served under /converted/ until the retention sweeper removes them."
    ),
    paths(
        health::health_check,
        handlers::formats::list_formats,
        handlers::convert_image::convert_image,
        handlers::convert_audio::convert_audio,
        handlers::upload::upload_file,
    ),
    components(schemas(
        ErrorResponse,
        models::HealthResponse,
        models::FormatsResponse,
        models::InputFormats,
        models::OutputFormats,
        models::OriginalFileInfo,
        models::ImageDimensions,
        models::ImageOptions,
        models::AudioOptions,
        models::ConvertedImageInfo,
        models::ImageConversionResponse,
        models::ConvertedAudioInfo,
        models::AudioConversionResponse,
        models::StoredFileInfo,
        models::UploadResponse,
        models::MediaKind,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "formats", description = "Supported input and output formats"),
        (name = "conversion", description = "Image and audio conversion"),
        (name = "upload", description = "Plain file upload"),
    )
)]
pub struct ApiDoc;
