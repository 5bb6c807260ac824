/*++

Licensed under the Apache-2.0 license.

File Name:

    sbox.rs

Abstract:

    File contains the KHAZAD substitution box, generated from its 4-bit
    mini-boxes the same way the hardware wires it.

--*/

/// Mini-box P
const P: [u8; 16] = [
    0x3, 0xf, 0xe, 0x0, 0x5, 0x4, 0xb, 0xc, 0xd, 0xa, 0x9, 0x6, 0x7, 0x8, 0x2, 0x1,
];

/// Mini-box Q
const Q: [u8; 16] = [
    0x9, 0xe, 0x5, 0x6, 0xa, 0x2, 0x3, 0xc, 0xf, 0x0, 0x4, 0xd, 0x7, 0xb, 0x1, 0x8,
];

/// Bit shuffle between mini-box layers: the upper two bits of each nibble
/// form the new high nibble, the lower two bits the new low nibble.
const fn mix(x: u8) -> u8 {
    let hi = x >> 4;
    let lo = x & 0xf;
    (((hi & 0xc) | (lo >> 2)) << 4) | ((hi & 0x3) << 2) | (lo & 0x3)
}

const fn layer(x: u8, hi_box: &[u8; 16], lo_box: &[u8; 16]) -> u8 {
    (hi_box[(x >> 4) as usize] << 4) | lo_box[(x & 0xf) as usize]
}

const fn substitute(x: u8) -> u8 {
    let x = mix(layer(x, &P, &Q));
    let x = mix(layer(x, &Q, &P));
    layer(x, &P, &Q)
}

const fn make_sbox() -> [u8; 256] {
    let mut sbox = [0u8; 256];
    let mut x = 0;
    while x < 256 {
        sbox[x] = substitute(x as u8);
        x += 1;
    }
    sbox
}

pub(crate) const SBOX: [u8; 256] = make_sbox();
