/// BERT and RoBERTa sequence classifiers
pub mod bert;
