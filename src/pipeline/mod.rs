pub mod correction; // Dictionary correction and medication recognition
pub mod extraction; // Raster acquisition, OCR, and the end-to-end flow
