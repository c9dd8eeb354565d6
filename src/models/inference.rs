//! Fraud classifier inference over assembled transaction records

use crate::config::ModelConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::transaction::{FeatureValue, TransactionRecord};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::sync::RwLock;
use tracing::{debug, warn};

/// The two operations the scoring pipeline consumes from a trained model.
///
/// The model is an opaque, already-trained artifact: loading happens once at
/// startup and the instance is treated as immutable afterwards.
pub trait Classifier: Send + Sync {
    /// Fraud probability in [0, 1] for the given record
    fn predict_probability(&self, record: &TransactionRecord) -> Result<f64>;

    /// Predicted class label: 1 = fraud, 0 = legitimate
    fn predict_label(&self, record: &TransactionRecord) -> Result<u8>;
}

/// ONNX Runtime implementation of [`Classifier`].
///
/// The session is wrapped in an `RwLock` because running it requires mutable
/// access; semantically the model is read-only after load.
pub struct OnnxClassifier {
    model: RwLock<LoadedModel>,
}

impl OnnxClassifier {
    /// Load the classifier described by the model configuration.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load(&config.path, config)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Split the feature row into the categorical (text) and numeric tensors
    /// the model consumes. Relative column order within each group follows
    /// the schema order.
    fn encode_inputs(record: &TransactionRecord) -> (Vec<String>, Vec<f32>) {
        let mut categorical = Vec::new();
        let mut numeric = Vec::new();

        for cell in record.feature_row() {
            match cell {
                FeatureValue::Text(s) => categorical.push(s),
                FeatureValue::Float(f) => numeric.push(f as f32),
                FeatureValue::Int(i) => numeric.push(i as f32),
            }
        }

        (categorical, numeric)
    }

    /// Run the session once for the given record and hand the outputs to the
    /// extraction closure along with the resolved output names.
    fn run<T>(
        &self,
        record: &TransactionRecord,
        extract: impl FnOnce(&ort::session::SessionOutputs, &str, Option<&str>) -> Result<T>,
    ) -> Result<T> {
        let (categorical, numeric) = Self::encode_inputs(record);

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let cat_shape = vec![1_i64, categorical.len() as i64];
        let cat_tensor = Tensor::from_string_array((cat_shape, categorical.as_slice()))
            .context("Failed to create categorical input tensor")?;

        let num_shape = vec![1_i64, numeric.len() as i64];
        let num_tensor = Tensor::from_array((num_shape, numeric))
            .context("Failed to create numeric input tensor")?;

        // The run call borrows the session mutably; resolve the names first.
        let numeric_input = model.numeric_input.clone();
        let categorical_input = model.categorical_input.clone();
        let probability_output = model.probability_output.clone();
        let label_output = model.label_output.clone();

        let outputs = model.session.run(ort::inputs![
            &numeric_input => num_tensor,
            &categorical_input => cat_tensor,
        ])?;

        extract(&outputs, &probability_output, label_output.as_deref())
    }

    /// Extract the fraud (class 1) probability from the session outputs.
    ///
    /// Gradient-boosting exports emit either a plain tensor or a
    /// seq(map(int64, float)); both forms are handled.
    fn extract_probability(
        outputs: &ort::session::SessionOutputs,
        probability_output: &str,
    ) -> Result<f64> {
        if let Some(output) = outputs.get(probability_output) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = Self::fraud_prob_from_tensor(&shape, data);
                debug!(prob = prob, "Extracted probability from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::fraud_prob_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: iterate all outputs and try extraction
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = Self::fraud_prob_from_tensor(&shape, data);
                debug!(output = %name, prob = prob, "Extracted probability from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::fraud_prob_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        anyhow::bail!("No probability output found in model outputs")
    }

    /// Extract probability from seq(map(int64, float)) output format
    fn fraud_prob_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        if maps.is_empty() {
            anyhow::bail!("Empty sequence in probability output");
        }

        // Batch size is always 1
        let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                debug!(prob = *prob, "Extracted probability from seq(map)");
                return Ok(*prob as f64);
            }
        }

        // Only class 0 present: invert it
        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        anyhow::bail!("No class probability found in map")
    }

    /// Extract the fraud-class probability from tensor data
    fn fraud_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes]: fraud class is index 1
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        }

        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }

    /// Read the label output when the export carries one.
    fn extract_label(
        outputs: &ort::session::SessionOutputs,
        label_output: Option<&str>,
    ) -> Option<u8> {
        let name = label_output?;
        let output = outputs.get(name)?;

        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return data.first().map(|&v| (v != 0) as u8);
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return data.first().map(|&v| (v >= 0.5) as u8);
        }

        None
    }
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, record: &TransactionRecord) -> Result<f64> {
        self.run(record, |outputs, probability_output, _| {
            Self::extract_probability(outputs, probability_output)
        })
    }

    fn predict_label(&self, record: &TransactionRecord) -> Result<u8> {
        self.run(record, |outputs, probability_output, label_output| {
            if let Some(label) = Self::extract_label(outputs, label_output) {
                return Ok(label);
            }
            // Export without a label output: derive from the probability
            warn!("Model has no label output, deriving label from probability");
            let prob = Self::extract_probability(outputs, probability_output)?;
            Ok((prob >= 0.5) as u8)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{
        AgeGroup, Bank, Channel, DeviceType, MerchantCategory, TransactionType,
        CATEGORICAL_COLUMNS, FEATURE_COLUMNS,
    };

    fn sample_record() -> TransactionRecord {
        TransactionRecord {
            sender_upi_id: "user010055@okicici".to_string(),
            receiver_upi_id: "recv027483@okicici".to_string(),
            amount_inr: 5000.0,
            transaction_type: TransactionType::P2M,
            merchant_category: MerchantCategory::Recharge,
            channel: Channel::Paytm,
            device_type: DeviceType::Mobile,
            device_id: "DEV815551".to_string(),
            ip_risk_score: 0.0,
            city: "Unknown".to_string(),
            sender_age_group: AgeGroup::Age25To35,
            sender_bank: Bank::Icici,
            receiver_bank: Bank::Axis,
            account_age_days: 730,
            num_txns_last_24h: 2,
            avg_amount_last_7d: 4200.0,
            prev_fraud_count_sender: 0,
            prev_fraud_count_receiver: 1,
            transaction_note: "payment".to_string(),
            is_night_txn: 1,
            device_change_flag: 0,
        }
    }

    #[test]
    fn test_encode_inputs_splits_by_column_kind() {
        let (categorical, numeric) = OnnxClassifier::encode_inputs(&sample_record());

        assert_eq!(categorical.len(), CATEGORICAL_COLUMNS.len());
        assert_eq!(
            categorical.len() + numeric.len(),
            FEATURE_COLUMNS.len()
        );

        // Categorical cells keep their schema-relative order
        assert_eq!(categorical[0], "user010055@okicici");
        assert_eq!(categorical[2], "P2M");
        assert_eq!(categorical[8], "25-35");
        assert_eq!(categorical[11], "payment");

        // Numeric cells keep theirs
        assert_eq!(numeric[0], 5000.0); // Amount_INR
        assert_eq!(numeric[1], 0.0); // IP_Risk_Score
        assert_eq!(numeric[2], 730.0); // Account_Age_Days
        assert_eq!(numeric[7], 1.0); // Is_Night_Txn
        assert_eq!(numeric[8], 0.0); // Device_Change_Flag
    }
}
