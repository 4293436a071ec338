use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::error::{FramelaneError, FramelaneResult};

/// Color family of a frame format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFamily {
    /// Single luma plane.
    Gray,
    /// Luma plane plus two (possibly subsampled) chroma planes.
    Yuv,
    /// Three full-resolution planes.
    Rgb,
}

/// Planar sample layout of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameFormat {
    /// Color family.
    pub family: ColorFamily,
    /// Bytes per sample (1 for 8-bit, 2 for 9..16-bit).
    pub bytes_per_sample: u8,
    /// Horizontal chroma subsampling as a power of two (YUV only).
    pub subsampling_w: u8,
    /// Vertical chroma subsampling as a power of two (YUV only).
    pub subsampling_h: u8,
}

impl FrameFormat {
    /// 8-bit single plane.
    pub const GRAY8: Self = Self::new(ColorFamily::Gray, 1, 0, 0);
    /// 16-bit single plane.
    pub const GRAY16: Self = Self::new(ColorFamily::Gray, 2, 0, 0);
    /// 8-bit 4:2:0 YUV.
    pub const YUV420P8: Self = Self::new(ColorFamily::Yuv, 1, 1, 1);
    /// 16-bit 4:2:0 YUV.
    pub const YUV420P16: Self = Self::new(ColorFamily::Yuv, 2, 1, 1);
    /// 8-bit 4:4:4 YUV.
    pub const YUV444P8: Self = Self::new(ColorFamily::Yuv, 1, 0, 0);
    /// 8-bit planar RGB.
    pub const RGB24: Self = Self::new(ColorFamily::Rgb, 1, 0, 0);

    /// Build a format description.
    pub const fn new(
        family: ColorFamily,
        bytes_per_sample: u8,
        subsampling_w: u8,
        subsampling_h: u8,
    ) -> Self {
        Self {
            family,
            bytes_per_sample,
            subsampling_w,
            subsampling_h,
        }
    }

    /// Number of planes in this format.
    pub fn num_planes(self) -> usize {
        match self.family {
            ColorFamily::Gray => 1,
            ColorFamily::Yuv | ColorFamily::Rgb => 3,
        }
    }

    /// Plane dimensions in samples for a frame of `width x height`.
    ///
    /// Chroma planes round up, so odd luma sizes keep at least one chroma sample.
    pub fn plane_dims(self, plane: usize, width: u32, height: u32) -> (u32, u32) {
        if plane == 0 || self.family != ColorFamily::Yuv {
            return (width, height);
        }
        let sw = 1u32 << self.subsampling_w;
        let sh = 1u32 << self.subsampling_h;
        (width.div_ceil(sw), height.div_ceil(sh))
    }

    /// Byte length of one plane.
    pub fn plane_len(self, plane: usize, width: u32, height: u32) -> usize {
        let (w, h) = self.plane_dims(plane, width, height);
        (w as usize)
            .saturating_mul(h as usize)
            .saturating_mul(self.bytes_per_sample as usize)
    }

    /// Byte length of one whole frame (all planes back to back).
    pub fn frame_len(self, width: u32, height: u32) -> usize {
        (0..self.num_planes())
            .map(|p| self.plane_len(p, width, height))
            .sum()
    }
}

/// Opaque handle to a node owned by the external engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeRef(pub u64);

/// Variant-typed frame property value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropValue {
    /// Integer property.
    Int(i64),
    /// Floating point property.
    Float(f64),
    /// String property.
    Str(String),
    /// Reference to another engine node.
    Node(NodeRef),
}

impl PropValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Node(_) => "node",
        }
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<NodeRef> for PropValue {
    fn from(v: NodeRef) -> Self {
        Self::Node(v)
    }
}

/// String-keyed frame property bag.
pub type PropMap = BTreeMap<String, PropValue>;

/// One computed frame: planar payload plus its property bag.
///
/// Payload bytes are shared; cloning a frame never copies pixels.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Sample layout.
    pub format: FrameFormat,
    data: Arc<[u8]>,
    props: PropMap,
}

impl Frame {
    /// Build a frame from planar bytes (planes back to back).
    pub fn new(
        width: u32,
        height: u32,
        format: FrameFormat,
        data: Vec<u8>,
    ) -> FramelaneResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramelaneError::validation(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = format.frame_len(width, height);
        if data.len() != expected {
            return Err(FramelaneError::validation(format!(
                "frame payload is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data: data.into(),
            props: PropMap::new(),
        })
    }

    /// Zero-filled frame.
    pub fn blank(width: u32, height: u32, format: FrameFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0u8; format.frame_len(width, height)].into(),
            props: PropMap::new(),
        }
    }

    /// Builder-style property insert.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set_prop(key, value);
        self
    }

    /// Insert or replace a property.
    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.props.insert(key.into(), value.into());
    }

    /// Borrow the property bag.
    pub fn props(&self) -> &PropMap {
        &self.props
    }

    /// Look up a property without type checking.
    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Integer property, failing when absent or of another type.
    pub fn prop_int(&self, key: &str) -> FramelaneResult<i64> {
        match self.require(key)? {
            PropValue::Int(v) => Ok(*v),
            other => Err(wrong_type(key, "int", other)),
        }
    }

    /// Float property. Integers are accepted and widened.
    pub fn prop_float(&self, key: &str) -> FramelaneResult<f64> {
        match self.require(key)? {
            PropValue::Float(v) => Ok(*v),
            PropValue::Int(v) => Ok(*v as f64),
            other => Err(wrong_type(key, "float", other)),
        }
    }

    /// String property.
    pub fn prop_str(&self, key: &str) -> FramelaneResult<&str> {
        match self.require(key)? {
            PropValue::Str(v) => Ok(v.as_str()),
            other => Err(wrong_type(key, "str", other)),
        }
    }

    /// Node-reference property.
    pub fn prop_node(&self, key: &str) -> FramelaneResult<NodeRef> {
        match self.require(key)? {
            PropValue::Node(v) => Ok(*v),
            other => Err(wrong_type(key, "node", other)),
        }
    }

    fn require(&self, key: &str) -> FramelaneResult<&PropValue> {
        self.props
            .get(key)
            .ok_or_else(|| FramelaneError::frame_prop(key, "not present in props"))
    }

    /// Whole payload, planes back to back.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow one plane of the payload.
    pub fn plane(&self, plane: usize) -> &[u8] {
        let start: usize = (0..plane)
            .map(|p| self.format.plane_len(p, self.width, self.height))
            .sum();
        let len = self.format.plane_len(plane, self.width, self.height);
        &self.data[start..start + len]
    }

    /// Return `true` when this frame is a 1x1 placeholder.
    pub fn is_one_pixel(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Crop to the top-left pixel, keeping format and properties.
    ///
    /// A frame with no pixels is returned unchanged.
    pub fn crop_one_pixel(&self) -> Self {
        if self.is_one_pixel() || self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let bps = self.format.bytes_per_sample as usize;
        let mut data = Vec::with_capacity(self.format.frame_len(1, 1));
        for p in 0..self.format.num_planes() {
            let plane = self.plane(p);
            data.extend_from_slice(&plane[..bps.min(plane.len())]);
        }
        Self {
            width: 1,
            height: 1,
            format: self.format,
            data: data.into(),
            props: self.props.clone(),
        }
    }
}

fn wrong_type(key: &str, expected: &str, got: &PropValue) -> FramelaneError {
    FramelaneError::frame_prop(
        key,
        format!(
            "did not contain expected type: expected {expected} got {}",
            got.type_name()
        ),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/source/frame.rs"]
mod tests;
