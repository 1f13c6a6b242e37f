// The run loop's only suspension point
//
// WFI parks the hart until any enabled interrupt is pending; the ISR
// runs, returns, and execution resumes after the instruction. There is
// no timeout and no cancellation short of a reset.

#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    core::hint::spin_loop();
}
