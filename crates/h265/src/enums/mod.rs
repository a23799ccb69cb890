mod aspect_ratio_idc;
mod video_format;

pub use aspect_ratio_idc::AspectRatioIdc;
pub use video_format::VideoFormat;
