// Table statique extension -> type MIME (extensions en minuscules).
pub(crate) const EXTENSIONS: &[(&str, &str)] = &[
    // Vidéo
    ("avi", "video/x-msvideo"),
    ("divx", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("mpe", "video/mpeg"),
    ("m2ts", "video/mp2t"),
    ("mts", "video/mp2t"),
    ("ts", "video/mp2t"),
    ("vob", "video/mpeg"),
    ("wmv", "video/x-ms-wmv"),
    ("asf", "video/x-ms-asf"),
    ("flv", "video/x-flv"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("3gp", "video/3gpp"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wav", "audio/x-wav"),
    ("wma", "audio/x-ms-wma"),
    ("aif", "audio/x-aiff"),
    ("aiff", "audio/x-aiff"),
    ("ape", "audio/x-ape"),
    ("mka", "audio/x-matroska"),
    ("m3u", "audio/x-mpegurl"),
    // Image
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    // Sous-titres
    ("srt", "application/x-subrip"),
];
