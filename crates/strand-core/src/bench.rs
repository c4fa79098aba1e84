//! Benchmark and stress profiles
//!
//! Stress tests and soak runs scale their thread and iteration counts to the
//! machine they are built for. The profile is fixed at compile time:
//!
//! - `bench-profile-*` cargo features force a profile explicitly
//! - otherwise the CPU family (`target_arch`) decides
//!
//! | Profile | CPU families                                          |
//! |---------|-------------------------------------------------------|
//! | Large   | x86_64, powerpc64, s390x                              |
//! | Medium  | x86, powerpc, loongarch64, aarch64, mips64, riscv64   |
//! | Small   | everything else (embedded, 32-bit ARM, ...)           |

use serde::{Deserialize, Serialize};

/// Workload size class for stress tests and soak runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchProfile {
    /// Workstation-class CPUs
    Large,
    /// Powerful SBCs and capable 64-bit cores
    Medium,
    /// Weak CPUs and embedded targets
    Small,
}

impl BenchProfile {
    /// Profile selected for this build
    pub const fn current() -> Self {
        if cfg!(feature = "bench-profile-large") {
            BenchProfile::Large
        } else if cfg!(feature = "bench-profile-medium") {
            BenchProfile::Medium
        } else if cfg!(feature = "bench-profile-small") {
            BenchProfile::Small
        } else {
            Self::for_target()
        }
    }

    /// Profile derived from the CPU family only
    const fn for_target() -> Self {
        if cfg!(any(
            target_arch = "x86_64",
            target_arch = "powerpc64",
            target_arch = "s390x"
        )) {
            BenchProfile::Large
        } else if cfg!(any(
            target_arch = "x86",
            target_arch = "powerpc",
            target_arch = "loongarch64",
            target_arch = "aarch64",
            target_arch = "mips64",
            target_arch = "riscv64"
        )) {
            BenchProfile::Medium
        } else {
            BenchProfile::Small
        }
    }

    /// Get the name of this profile
    pub fn name(&self) -> &'static str {
        match self {
            BenchProfile::Large => "large",
            BenchProfile::Medium => "medium",
            BenchProfile::Small => "small",
        }
    }

    /// Number of concurrent writer threads for stress runs
    pub const fn stress_threads(&self) -> usize {
        match self {
            BenchProfile::Large => 16,
            BenchProfile::Medium => 8,
            BenchProfile::Small => 2,
        }
    }

    /// Iterations each stress thread performs
    pub const fn stress_iterations(&self) -> usize {
        match self {
            BenchProfile::Large => 100_000,
            BenchProfile::Medium => 20_000,
            BenchProfile::Small => 2_000,
        }
    }
}

impl Default for BenchProfile {
    fn default() -> Self {
        Self::current()
    }
}
