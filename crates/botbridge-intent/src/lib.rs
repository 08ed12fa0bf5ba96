// SPDX-FileCopyrightText: 2026 Botbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and parameter extraction.
//!
//! Pure, synchronous, non-blocking computations: the pipeline calls
//! [`IntentDetector`] to route inbound text and [`ParameterExtractor`] to
//! fill action parameters before execution.

pub mod detector;
pub mod extractor;

pub use detector::IntentDetector;
pub use extractor::{ExtractionMethod, ExtractionResult, ParameterExtractor};
