// See https://www.cog-genomics.org/plink/1.9/formats#bed for the v1.00
// header layout; 0.99 and earlier variants are reconstructed from the
// plink source history.

pub(crate) const HEADER_MAX_SIZE: usize = 3;

const V100_MAGIC: [u8; 2] = [0x6c, 0x1b];
const SNP_ORDER_BIT: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedVersion {
    /// Headerless, one sample per row.
    Pre099,
    /// One header byte carrying the row order.
    V099,
    /// Two magic bytes followed by the row order byte.
    V100,
}

/// Whether a data row spans all samples of one locus or all loci of one
/// sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnpOrder {
    OneLocusPerRow,
    OneSamplePerRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BedHeader {
    version: BedVersion,
    snp_order: SnpOrder,
    num_loci: usize,
    num_samples: usize,
}

// An order byte of exactly 0x01 means one locus per row; anything else
// falls back to one sample per row, for both the v1.00 and v0.99
// positions.
fn decode_order(byte: u8) -> SnpOrder {
    if byte == SNP_ORDER_BIT {
        SnpOrder::OneLocusPerRow
    } else {
        SnpOrder::OneSamplePerRow
    }
}

fn encode_order(snp_order: SnpOrder) -> u8 {
    match snp_order {
        SnpOrder::OneLocusPerRow => 1,
        SnpOrder::OneSamplePerRow => 0,
    }
}

impl BedHeader {
    /// Header for a freshly created file: current version, one locus per
    /// row.
    pub fn new(num_loci: usize, num_samples: usize) -> Self {
        Self {
            version: BedVersion::V100,
            snp_order: SnpOrder::OneLocusPerRow,
            num_loci,
            num_samples,
        }
    }

    /// Header for an ingest working file: one sample per row, samples
    /// appended as they stream in.
    pub(crate) fn new_transposed(num_loci: usize, num_samples: usize) -> Self {
        Self {
            version: BedVersion::V100,
            snp_order: SnpOrder::OneSamplePerRow,
            num_loci,
            num_samples,
        }
    }

    /// Decode version and row order from the first bytes of a file. The
    /// counts are not stored on disk and must be supplied from the
    /// sibling tables.
    pub fn from_bytes(bytes: &[u8], num_loci: usize, num_samples: usize) -> Self {
        let (version, snp_order) = if bytes.len() >= 3 && bytes[..2] == V100_MAGIC {
            (BedVersion::V100, decode_order(bytes[2]))
        } else if !bytes.is_empty() && bytes[0] & !SNP_ORDER_BIT == 0 {
            (BedVersion::V099, decode_order(bytes[0]))
        } else {
            (BedVersion::Pre099, SnpOrder::OneSamplePerRow)
        };
        Self {
            version,
            snp_order,
            num_loci,
            num_samples,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self.version {
            BedVersion::V100 => vec![V100_MAGIC[0], V100_MAGIC[1], encode_order(self.snp_order)],
            BedVersion::V099 => vec![encode_order(self.snp_order)],
            BedVersion::Pre099 => Vec::new(),
        }
    }

    pub fn version(&self) -> BedVersion {
        self.version
    }

    pub fn snp_order(&self) -> SnpOrder {
        self.snp_order
    }

    pub fn num_loci(&self) -> usize {
        self.num_loci
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn data_offset(&self) -> usize {
        match self.version {
            BedVersion::V100 => 3,
            BedVersion::V099 => 1,
            BedVersion::Pre099 => 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        match self.snp_order {
            SnpOrder::OneLocusPerRow => self.num_loci,
            SnpOrder::OneSamplePerRow => self.num_samples,
        }
    }

    pub fn num_cols(&self) -> usize {
        match self.snp_order {
            SnpOrder::OneLocusPerRow => self.num_samples,
            SnpOrder::OneSamplePerRow => self.num_loci,
        }
    }

    /// Packed bytes per data row.
    pub fn row_bytes(&self) -> usize {
        self.num_cols().div_ceil(4)
    }

    pub fn data_size(&self) -> usize {
        self.num_rows() * self.row_bytes()
    }

    pub fn file_size(&self) -> usize {
        self.data_offset() + self.data_size()
    }

    /// Swap the row order; the counts stay put, so the derived geometry
    /// flips.
    pub(crate) fn transpose(&mut self) {
        self.snp_order = match self.snp_order {
            SnpOrder::OneLocusPerRow => SnpOrder::OneSamplePerRow,
            SnpOrder::OneSamplePerRow => SnpOrder::OneLocusPerRow,
        };
    }

    /// Account for one appended row in the order-dependent count.
    pub(crate) fn add_row(&mut self) {
        match self.snp_order {
            SnpOrder::OneLocusPerRow => self.num_loci += 1,
            SnpOrder::OneSamplePerRow => self.num_samples += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v100_header_decodes_magic_and_order() {
        let header = BedHeader::from_bytes(&[0x6c, 0x1b, 0x01], 5, 3);
        assert_eq!(header.version(), BedVersion::V100);
        assert_eq!(header.snp_order(), SnpOrder::OneLocusPerRow);
        assert_eq!(header.data_offset(), 3);
        assert_eq!(header.num_rows(), 5);
        assert_eq!(header.num_cols(), 3);
    }

    #[test]
    fn v099_header_decodes_order_from_first_byte() {
        let header = BedHeader::from_bytes(&[0x00, 0x00, 0x00], 5, 3);
        assert_eq!(header.version(), BedVersion::V099);
        assert_eq!(header.snp_order(), SnpOrder::OneSamplePerRow);
        assert_eq!(header.data_offset(), 1);
        assert_eq!(header.num_rows(), 3);
        assert_eq!(header.num_cols(), 5);
    }

    #[test]
    fn unversioned_header_is_sample_major() {
        let header = BedHeader::from_bytes(&[0x02, 0x01, 0x01], 5, 3);
        assert_eq!(header.version(), BedVersion::Pre099);
        assert_eq!(header.snp_order(), SnpOrder::OneSamplePerRow);
        assert_eq!(header.data_offset(), 0);
    }

    #[test]
    fn unknown_order_bytes_fall_back_to_sample_major() {
        let v100 = BedHeader::from_bytes(&[0x6c, 0x1b, 0x02], 1, 1);
        assert_eq!(v100.snp_order(), SnpOrder::OneSamplePerRow);
    }

    #[test]
    fn headers_round_trip_through_bytes() {
        for order in [SnpOrder::OneLocusPerRow, SnpOrder::OneSamplePerRow] {
            for version in [BedVersion::V099, BedVersion::V100] {
                let header = BedHeader {
                    version,
                    snp_order: order,
                    num_loci: 7,
                    num_samples: 2,
                };
                let mut bytes = header.to_bytes();
                assert_eq!(bytes.len(), header.data_offset());
                bytes.resize(HEADER_MAX_SIZE, 0xee);
                let decoded = BedHeader::from_bytes(&bytes, 7, 2);
                assert_eq!(decoded, header);
            }
        }
    }

    #[test]
    fn geometry_follows_the_order() {
        let mut header = BedHeader::new(2, 7);
        assert_eq!(header.row_bytes(), 2);
        assert_eq!(header.data_size(), 4);
        assert_eq!(header.file_size(), 7);

        header.transpose();
        assert_eq!(header.num_rows(), 7);
        assert_eq!(header.num_cols(), 2);
        assert_eq!(header.row_bytes(), 1);
        assert_eq!(header.file_size(), 10);
    }

    #[test]
    fn add_row_bumps_the_order_dependent_count() {
        let mut header = BedHeader::new(0, 4);
        header.add_row();
        assert_eq!(header.num_loci(), 1);

        let mut transposed = BedHeader::new_transposed(4, 0);
        transposed.add_row();
        assert_eq!(transposed.num_samples(), 1);
        assert_eq!(transposed.num_rows(), 1);
    }
}
