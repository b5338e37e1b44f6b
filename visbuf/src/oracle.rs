use visbuf_tensor::Shape;

/// Which of the buffer's dimensions an array field's shape must track.
///
/// The row axis, where a pattern has one, is always last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapePattern {
    /// The cache never validates or resizes this field's shape.
    NoCheck,
    /// `[nrows]`
    PerRow,
    /// `[3, nrows]`, baseline coordinate triples.
    UvwPerRow,
    /// `[ncorrelations, nrows]`
    PerCorrelationPerRow,
    /// `[nchannels, nrows]`
    PerChannelPerRow,
    /// `[ncorrelations, nchannels, nrows]`
    PerCorrelationPerChannelPerRow,
    /// `[nantennas]`, not row-shaped; row-count changes leave it alone.
    PerAntenna,
}

impl ShapePattern {
    /// True when the pattern's trailing axis is the buffer's row count, so
    /// the field participates in row append/truncate/resize.
    pub fn tracks_rows(self) -> bool {
        !matches!(self, ShapePattern::NoCheck | ShapePattern::PerAntenna)
    }

    /// True when the pattern's leading axis is the correlation axis, making
    /// the field eligible for correlation reordering.
    pub fn leads_with_correlations(self) -> bool {
        matches!(
            self,
            ShapePattern::PerCorrelationPerRow | ShapePattern::PerCorrelationPerChannelPerRow
        )
    }
}

/// Answers "what shape must a value of this pattern have right now?".
///
/// Pure query; implementations must not mutate. The owner of the dimensions
/// is responsible for resizing cached values immediately after any change
/// the oracle would report differently.
pub trait ShapeOracle {
    /// The full expected dimension vector for `pattern`, or `None` when the
    /// pattern is unchecked.
    fn expected_shape(&self, pattern: ShapePattern) -> Option<Shape>;
}

/// The current dimensions of one buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDims {
    nrows: usize,
    nchannels: usize,
    ncorrelations: usize,
    nantennas: usize,
}

impl BufferDims {
    /// Dimensions for a buffer of `nrows` rows with the given channel,
    /// correlation and antenna counts.
    pub fn new(nrows: usize, nchannels: usize, ncorrelations: usize, nantennas: usize) -> Self {
        Self {
            nrows,
            nchannels,
            ncorrelations,
            nantennas,
        }
    }

    /// Current row count.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Current channel count.
    pub fn nchannels(&self) -> usize {
        self.nchannels
    }

    /// Current correlation count.
    pub fn ncorrelations(&self) -> usize {
        self.ncorrelations
    }

    /// Current antenna count.
    pub fn nantennas(&self) -> usize {
        self.nantennas
    }

    pub(crate) fn set_rows(&mut self, nrows: usize) {
        self.nrows = nrows;
    }

    pub(crate) fn set_channels(&mut self, nchannels: usize) {
        self.nchannels = nchannels;
    }

    pub(crate) fn set_correlations(&mut self, ncorrelations: usize) {
        self.ncorrelations = ncorrelations;
    }

    pub(crate) fn set_antennas(&mut self, nantennas: usize) {
        self.nantennas = nantennas;
    }
}

impl ShapeOracle for BufferDims {
    fn expected_shape(&self, pattern: ShapePattern) -> Option<Shape> {
        match pattern {
            ShapePattern::NoCheck => None,
            ShapePattern::PerRow => Some(Shape::from([self.nrows])),
            ShapePattern::UvwPerRow => Some(Shape::from([3, self.nrows])),
            ShapePattern::PerCorrelationPerRow => {
                Some(Shape::from([self.ncorrelations, self.nrows]))
            }
            ShapePattern::PerChannelPerRow => Some(Shape::from([self.nchannels, self.nrows])),
            ShapePattern::PerCorrelationPerChannelPerRow => Some(Shape::from([
                self.ncorrelations,
                self.nchannels,
                self.nrows,
            ])),
            ShapePattern::PerAntenna => Some(Shape::from([self.nantennas])),
        }
    }
}
