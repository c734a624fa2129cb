#[inline]
pub(crate) fn le_u64(data: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[..8]);
    u64::from_le_bytes(buf)
}

#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    let head = data.first_chunk::<N>()?;
    Some((*head, &data[N..]))
}
