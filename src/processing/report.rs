//! Size accounting and the human-readable completion message.

use crate::core::CompressionReport;
use super::images::RecompressSummary;

/// Builds the report for a finished run.
pub fn build_report(original_size: u64, compressed_size: u64, images: &RecompressSummary) -> CompressionReport {
    let saved_bytes = original_size as i64 - compressed_size as i64;
    let compression_ratio = if original_size > 0 {
        saved_bytes as f64 / original_size as f64 * 100.0
    } else {
        0.0
    };

    CompressionReport {
        original_size,
        compressed_size,
        saved_bytes,
        compression_ratio,
        images_total: images.total,
        images_processed: images.processed,
        images_skipped: images.skipped,
        image_bytes_before: images.bytes_before,
        image_bytes_after: images.bytes_after,
        cancelled: images.cancelled,
    }
}

impl CompressionReport {
    /// `Compression succeeded! Original size: 152.00KB Compressed: 98.50KB (reduced by 35.2%)`
    pub fn summary(&self) -> String {
        let mut message = format!(
            "Compression succeeded!\nOriginal size: {:.2}KB Compressed: {:.2}KB (reduced by {:.1}%)",
            self.original_size as f64 / 1024.0,
            self.compressed_size as f64 / 1024.0,
            self.compression_ratio,
        );

        if self.cancelled {
            message.push_str(&format!(
                "\nCancelled after {} of {} images",
                self.images_processed + self.images_skipped,
                self.images_total,
            ));
        }

        message
    }
}
