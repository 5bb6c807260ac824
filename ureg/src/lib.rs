// Licensed under the Apache-2.0 license

//! Minimal volatile register access abstraction.
//!
//! Drivers are written against [`Mmio`] and [`MmioMut`] so the same code can
//! talk to real hardware through [`RealMmio`]/[`RealMmioMut`] or to an
//! emulated bus in host tests.
#![no_std]

use core::marker::PhantomData;

pub trait Mmio: Sized {
    /// Loads from address `src` and returns the value.
    ///
    /// # Safety
    ///
    /// Caller must ensure that the safety requirements of
    /// [`core::ptr::read_volatile`] are met.
    unsafe fn read_volatile<T: Clone + Copy + Sized>(&self, src: *const T) -> T;
}

pub trait MmioMut: Sized {
    /// Stores `src` to address `dst`.
    ///
    /// # Safety
    ///
    /// Caller must ensure that the safety requirements of
    /// [`core::ptr::write_volatile`] are met.
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T);
}

/// A zero-sized type that implements the Mmio trait with real reads from the
/// provided address.
#[derive(Clone, Copy, Default)]
pub struct RealMmio<'a>(PhantomData<&'a ()>);
impl Mmio for RealMmio<'_> {
    #[inline(always)]
    unsafe fn read_volatile<T: Clone + Copy + Sized>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}

/// A zero-sized type that implements the Mmio and MmioMut traits with real
/// reads and writes to the provided address.
#[derive(Clone, Copy, Default)]
pub struct RealMmioMut<'a>(PhantomData<&'a mut ()>);
impl Mmio for RealMmioMut<'_> {
    #[inline(always)]
    unsafe fn read_volatile<T: Clone + Copy + Sized>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}
impl MmioMut for RealMmioMut<'_> {
    #[inline(always)]
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T) {
        core::ptr::write_volatile(dst, src);
    }
}

impl<TMmio: Mmio> Mmio for &TMmio {
    #[inline(always)]
    unsafe fn read_volatile<T: Clone + Copy + Sized>(&self, src: *const T) -> T {
        (**self).read_volatile(src)
    }
}
impl<TMmio: MmioMut> MmioMut for &TMmio {
    #[inline(always)]
    unsafe fn write_volatile<T: Clone + Copy>(&self, dst: *mut T, src: T) {
        (**self).write_volatile(dst, src)
    }
}
