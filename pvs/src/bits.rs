#[cfg(feature = "hprof")]
use coarse_prof::profile;

/// Fixed-size bit vector stored as bytes.
///
/// Bit `i` lives in byte `i >> 3` under mask `1 << (i & 7)`, the same layout
/// the vis lumps use on disk, so a row can be handed to a writer as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisBits {
    bits: usize,
    data: Box<[u8]>,
}

impl VisBits {
    /// Zeroed set able to hold `bits` bits
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            data: vec![0; bytes_for(bits)].into_boxed_slice(),
        }
    }

    /// Number of addressable bits
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.bits
    }

    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn set(&mut self, bit: usize) {
        debug_assert!(bit < self.bits);
        self.data[bit >> 3] |= 1 << (bit & 7);
    }

    #[inline]
    pub fn clear(&mut self, bit: usize) {
        debug_assert!(bit < self.bits);
        self.data[bit >> 3] &= !(1 << (bit & 7));
    }

    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        self.data[bit >> 3] & (1 << (bit & 7)) != 0
    }

    /// Sets `bit` and returns whether it was already set
    #[inline]
    pub fn test_and_set(&mut self, bit: usize) -> bool {
        let mask = 1 << (bit & 7);
        let byte = &mut self.data[bit >> 3];
        let was = *byte & mask != 0;
        *byte |= mask;
        was
    }

    pub fn clear_all(&mut self) {
        self.data.fill(0);
    }

    /// OR the first `len_bytes()` bytes of `other` into this set
    pub fn or_assign(&mut self, other: &[u8]) {
        #[cfg(feature = "hprof")]
        profile!("vis_bits_or_assign");
        for (dst, src) in self.data.iter_mut().zip(other) {
            *dst |= *src;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.iter_ones().count()
    }

    /// Indices of all set bits, lowest first
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .flat_map(|(i, byte)| {
                (0..8)
                    .filter(move |b| byte & (1 << b) != 0)
                    .map(move |b| (i << 3) + b)
            })
            .filter(|bit| *bit < self.bits)
    }
}

/// Bytes needed for `bits` bits
#[inline]
pub const fn bytes_for(bits: usize) -> usize {
    bits.div_ceil(8)
}
