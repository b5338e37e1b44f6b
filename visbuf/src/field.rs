use std::fmt::{Display, Formatter};

use crate::ShapePattern;

/// A complex visibility sample as a `(re, im)` pair.
pub type Complex = [f32; 2];

/// Identity of one named field of a visibility buffer.
///
/// The set is closed: every buffer carries the same columns a measurement
/// row-group exposes, and the cache instantiates exactly one item per
/// identity it registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    // Per-buffer scalars.
    /// Number of rows in the buffer. Part of the buffer's identity.
    NRows,
    /// Number of spectral channels per row.
    NChannels,
    /// Number of correlation products per channel.
    NCorrelations,
    /// Number of antennas in the array.
    NAntennas,
    /// Spectral window the buffer was read from.
    SpectralWindow,
    /// Observed source field.
    SourceField,
    /// Data description id of the row-group.
    DataDescriptionId,
    /// Polarization setup id.
    PolarizationId,

    // Per-row arrays.
    /// Midpoint timestamp of each row, seconds.
    Time,
    /// First antenna of each baseline.
    Antenna1,
    /// Second antenna of each baseline.
    Antenna2,
    /// Scan number of each row.
    Scan,
    /// Integration time of each row, seconds.
    Exposure,
    /// Baseline coordinates, metres, `[3, nrows]`.
    Uvw,
    /// Whole-row flags.
    FlagRow,
    /// Per-correlation noise estimate, `[ncorr, nrows]`.
    Sigma,
    /// Per-correlation weights, `[ncorr, nrows]`.
    Weight,
    /// Sample flags, `[ncorr, nchan, nrows]`.
    FlagCube,
    /// Observed visibilities, `[ncorr, nchan, nrows]`.
    VisCube,
    /// Model visibilities, `[ncorr, nchan, nrows]`.
    ModelCube,
    /// Calibrated visibilities, `[ncorr, nchan, nrows]`.
    CorrectedCube,
    /// Feed position angle per antenna, derived from row times and the
    /// array geometry rather than read from storage.
    FeedPa,
    /// Storage row numbers backing this buffer. Not resized with the
    /// buffer; the cursor alone decides how many rows it describes.
    RowIds,
}

/// Whether a field caches a single value or a tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// One value per buffer.
    Scalar,
    /// A tensor whose shape tracks the buffer's dimensions.
    Tensor,
}

/// Static description of one field: its kind, the shape its values must
/// satisfy, and whether it participates in the buffer's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field this spec describes.
    pub id: FieldId,
    /// Scalar or tensor.
    pub kind: FieldKind,
    /// Shape the cached value must satisfy; `NoCheck` for scalars.
    pub pattern: ShapePattern,
    /// Key fields are part of the buffer's externally visible identity and
    /// can only be overwritten on a rekeyable buffer.
    pub key: bool,
    /// Computed fields are produced by their fill callback rather than read
    /// from storage, so they do not require the cursor to be fillable.
    pub computed: bool,
}

impl FieldId {
    /// Every field of the standard visibility buffer, in registration order.
    pub const ALL: &'static [FieldId] = &[
        FieldId::NRows,
        FieldId::NChannels,
        FieldId::NCorrelations,
        FieldId::NAntennas,
        FieldId::SpectralWindow,
        FieldId::SourceField,
        FieldId::DataDescriptionId,
        FieldId::PolarizationId,
        FieldId::Time,
        FieldId::Antenna1,
        FieldId::Antenna2,
        FieldId::Scan,
        FieldId::Exposure,
        FieldId::Uvw,
        FieldId::FlagRow,
        FieldId::Sigma,
        FieldId::Weight,
        FieldId::FlagCube,
        FieldId::VisCube,
        FieldId::ModelCube,
        FieldId::CorrectedCube,
        FieldId::FeedPa,
        FieldId::RowIds,
    ];

    /// The static descriptor for this field.
    pub fn spec(self) -> FieldSpec {
        use FieldId::*;
        use ShapePattern as P;

        let (kind, pattern, key, computed) = match self {
            NRows => (FieldKind::Scalar, P::NoCheck, true, false),
            NChannels | NAntennas | NCorrelations | PolarizationId => {
                (FieldKind::Scalar, P::NoCheck, false, false)
            }
            SpectralWindow | SourceField | DataDescriptionId => {
                (FieldKind::Scalar, P::NoCheck, true, false)
            }
            Time => (FieldKind::Tensor, P::PerRow, true, false),
            Antenna1 | Antenna2 => (FieldKind::Tensor, P::PerRow, true, false),
            Scan | Exposure | FlagRow => (FieldKind::Tensor, P::PerRow, false, false),
            Uvw => (FieldKind::Tensor, P::UvwPerRow, false, false),
            Sigma | Weight => (FieldKind::Tensor, P::PerCorrelationPerRow, false, false),
            FlagCube | VisCube | ModelCube | CorrectedCube => (
                FieldKind::Tensor,
                P::PerCorrelationPerChannelPerRow,
                false,
                false,
            ),
            FeedPa => (FieldKind::Tensor, P::PerAntenna, false, true),
            RowIds => (FieldKind::Tensor, P::NoCheck, false, false),
        };
        FieldSpec {
            id: self,
            kind,
            pattern,
            key,
            computed,
        }
    }

    /// The field's column-style name.
    pub fn name(self) -> &'static str {
        match self {
            FieldId::NRows => "nRows",
            FieldId::NChannels => "nChannels",
            FieldId::NCorrelations => "nCorrelations",
            FieldId::NAntennas => "nAntennas",
            FieldId::SpectralWindow => "spectralWindow",
            FieldId::SourceField => "sourceField",
            FieldId::DataDescriptionId => "dataDescriptionId",
            FieldId::PolarizationId => "polarizationId",
            FieldId::Time => "time",
            FieldId::Antenna1 => "antenna1",
            FieldId::Antenna2 => "antenna2",
            FieldId::Scan => "scan",
            FieldId::Exposure => "exposure",
            FieldId::Uvw => "uvw",
            FieldId::FlagRow => "flagRow",
            FieldId::Sigma => "sigma",
            FieldId::Weight => "weight",
            FieldId::FlagCube => "flagCube",
            FieldId::VisCube => "visCube",
            FieldId::ModelCube => "modelCube",
            FieldId::CorrectedCube => "correctedCube",
            FieldId::FeedPa => "feedPa",
            FieldId::RowIds => "rowIds",
        }
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
