//! # Channel adapter
//!
//! Splits a raw image array into the independent real matrices that get
//! decomposed, and stacks per-channel results back into the input layout.
//!
//! - `(H, W)` is a single grayscale channel.
//! - `(H, W, C)` with `C >= 3` is colour: the first three planes are used and
//!   any further planes (alpha) are dropped.
//! - A colour input whose three planes are equal under the configured
//!   [`GrayscaleDetection`] is decomposed once and replicated on merge.

use log::debug;
use ndarray::{stack, Array2, ArrayD, ArrayView2, ArrayViewD, Axis, Ix2, Ix3, IxDyn};
use num_traits::ToPrimitive;

use crate::error::{Error, NumericError, Result};
use crate::utils::all_close;

/// Number of colour planes kept from a multi-plane input.
pub const COLOR_PLANES: usize = 3;

/// How colour planes are compared before collapsing them into one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrayscaleDetection {
    /// Always decompose three planes.
    Disabled,
    /// Collapse only bit-identical planes.
    Exact,
    /// Collapse planes satisfying `|a - b| <= atol + rtol * |b|` element-wise.
    AllClose { rtol: f64, atol: f64 },
}

impl Default for GrayscaleDetection {
    fn default() -> Self {
        GrayscaleDetection::AllClose {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl GrayscaleDetection {
    pub fn planes_equal(&self, a: ArrayView2<f64>, b: ArrayView2<f64>) -> bool {
        match *self {
            GrayscaleDetection::Disabled => false,
            GrayscaleDetection::Exact => a == b,
            GrayscaleDetection::AllClose { rtol, atol } => all_close(a, b, rtol, atol),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// 2-D input, one channel.
    Grayscale,
    /// 3-D input, three independent planes.
    Color,
    /// 3-D input whose planes matched; one channel standing for all three.
    CollapsedColor,
}

impl ChannelLayout {
    /// Matrices that go through the decomposer.
    pub fn decomposed_channels(&self) -> usize {
        match self {
            ChannelLayout::Grayscale | ChannelLayout::CollapsedColor => 1,
            ChannelLayout::Color => COLOR_PLANES,
        }
    }

    /// Planes in the merged output; `1` means no trailing axis.
    pub fn output_channels(&self) -> usize {
        match self {
            ChannelLayout::Grayscale => 1,
            ChannelLayout::Color | ChannelLayout::CollapsedColor => COLOR_PLANES,
        }
    }
}

/// Matrices split from one input, plus what is needed to put them back together.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSet {
    layout: ChannelLayout,
    input_shape: Vec<usize>,
    channels: Vec<Array2<f64>>,
}

impl ChannelSet {
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    pub fn channels(&self) -> &[Array2<f64>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Array2<f64>> {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// `(H, W)` shared by every channel.
    pub fn plane_dim(&self) -> (usize, usize) {
        (self.input_shape[0], self.input_shape[1])
    }

    /// Shape [`merge_layout`] produces for this set.
    pub fn output_shape(&self) -> Vec<usize> {
        let (h, w) = self.plane_dim();
        match self.layout.output_channels() {
            1 => vec![h, w],
            c => vec![h, w, c],
        }
    }

    /// Merges per-channel results with this set's layout.
    pub fn merge(&self, channels: &[Array2<f64>]) -> Result<ArrayD<f64>> {
        merge_layout(self.layout, channels)
    }
}

/// Splits a 2-D or 3-D sample array into real-valued channels.
pub fn split<T>(input: ArrayViewD<T>, detection: GrayscaleDetection) -> Result<ChannelSet>
where
    T: ToPrimitive,
{
    let shape = input.shape().to_vec();
    if shape.len() < 2 || shape.len() > 3 {
        return Err(Error::shape(&shape, "expected a 2-D or 3-D array"));
    }
    if shape.iter().any(|&d| d == 0) {
        return Err(Error::shape(&shape, "array has an empty dimension"));
    }

    let data = to_f64(&input)?;
    let set = if shape.len() == 2 {
        let plane = data
            .into_dimensionality::<Ix2>()
            .map_err(|_| Error::shape(&shape, "expected a 2-D array"))?;
        ChannelSet {
            layout: ChannelLayout::Grayscale,
            input_shape: shape,
            channels: vec![plane],
        }
    } else {
        if shape[2] < COLOR_PLANES {
            return Err(Error::shape(&shape, "colour input needs at least 3 planes"));
        }
        let cube = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| Error::shape(&shape, "expected a 3-D array"))?;
        let planes: Vec<Array2<f64>> = (0..COLOR_PLANES)
            .map(|c| cube.index_axis(Axis(2), c).to_owned())
            .collect();

        let gray = detection.planes_equal(planes[0].view(), planes[1].view())
            && detection.planes_equal(planes[1].view(), planes[2].view());
        if gray {
            ChannelSet {
                layout: ChannelLayout::CollapsedColor,
                input_shape: shape,
                channels: planes.into_iter().take(1).collect(),
            }
        } else {
            ChannelSet {
                layout: ChannelLayout::Color,
                input_shape: shape,
                channels: planes,
            }
        }
    };

    debug!(
        "Split {:?} input into {} channel(s) as {:?}",
        set.input_shape,
        set.len(),
        set.layout
    );
    Ok(set)
}

/// Stacks 1 or 3 equally shaped matrices.
///
/// One channel is returned as the matrix itself, `(H, W)`; three are stacked
/// along a new trailing axis, `(H, W, 3)`.
pub fn merge(channels: &[Array2<f64>]) -> Result<ArrayD<f64>> {
    let shapes: Vec<usize> = channels.iter().flat_map(|c| c.shape().to_vec()).collect();
    match channels {
        [single] => Ok(single.clone().into_dyn()),
        [first, rest @ ..] if channels.len() == COLOR_PLANES => {
            if rest.iter().any(|c| c.dim() != first.dim()) {
                return Err(Error::shape(&shapes, "channels differ in shape"));
            }
            let views: Vec<ArrayView2<f64>> = channels.iter().map(|c| c.view()).collect();
            let stacked = stack(Axis(2), &views)
                .map_err(|_| Error::shape(&shapes, "channels cannot be stacked"))?;
            Ok(stacked.into_dyn())
        }
        _ => Err(Error::shape(&shapes, "expected 1 or 3 channels")),
    }
}

/// Reverses [`split`] for the given layout, replicating a collapsed channel.
pub fn merge_layout(layout: ChannelLayout, channels: &[Array2<f64>]) -> Result<ArrayD<f64>> {
    if channels.len() != layout.decomposed_channels() {
        let shapes: Vec<usize> = channels.iter().flat_map(|c| c.shape().to_vec()).collect();
        return Err(Error::shape(&shapes, "channel count does not match layout"));
    }
    match layout {
        ChannelLayout::CollapsedColor => {
            let replicated = vec![channels[0].clone(); COLOR_PLANES];
            merge(&replicated)
        }
        ChannelLayout::Grayscale | ChannelLayout::Color => merge(channels),
    }
}

fn to_f64<T: ToPrimitive>(input: &ArrayViewD<T>) -> Result<ArrayD<f64>> {
    let values = input
        .iter()
        .enumerate()
        .map(|(index, x)| {
            x.to_f64()
                .ok_or_else(|| NumericError::SampleConversion { index }.into())
        })
        .collect::<Result<Vec<f64>>>()?;
    ArrayD::from_shape_vec(IxDyn(input.shape()), values)
        .map_err(|_| Error::shape(input.shape(), "sample count does not match shape"))
}
