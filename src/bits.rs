// Bit-parallel helpers over 2-bit genotype pairs packed into machine
// words, shared by the allele counting and flipping fast paths. A pair
// holds a disk-encoded genotype: 00 hom-first, 01 missing, 10 het,
// 11 hom-second.

pub(crate) trait PackedWord: Copy {
    /// Mask with `11` in every pair position holding a homozygous call
    /// (`00` or `11`) and `00` elsewhere.
    fn homozygous_mask(self) -> Self;

    /// Copies of the first allele across the word's pairs.
    fn count_first(self) -> u32;

    /// Copies of the second allele across the word's pairs.
    fn count_second(self) -> u32;

    /// Swap `00` and `11` pairs; heterozygous and missing pairs pass
    /// through unchanged.
    fn flip_homozygous(self) -> Self;
}

macro_rules! packed_word {
    ($ty:ty, $hi:literal, $lo:literal) => {
        impl PackedWord for $ty {
            #[inline]
            fn homozygous_mask(self) -> Self {
                let equal = !(self ^ ((self & $hi) >> 1)) & $lo;
                equal | (equal << 1)
            }

            #[inline]
            fn count_first(self) -> u32 {
                let hom = self.homozygous_mask();
                // Hom-first pairs contribute two copies, het pairs one.
                ((!self & hom) | (self & !hom & $hi)).count_ones()
            }

            #[inline]
            fn count_second(self) -> u32 {
                let hom = self.homozygous_mask();
                ((self & hom) | (self & !hom & $hi)).count_ones()
            }

            #[inline]
            fn flip_homozygous(self) -> Self {
                let hom = self.homozygous_mask();
                (!self & hom) | (self & !hom)
            }
        }
    };
}

packed_word!(u8, 0xaa, 0x55);
packed_word!(u16, 0xaaaa, 0x5555);
packed_word!(u32, 0xaaaa_aaaa, 0x5555_5555);
packed_word!(u64, 0xaaaa_aaaa_aaaa_aaaa, 0x5555_5555_5555_5555);
