use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Build a `[rows, seq_length]` integer tensor from equal-length rows
pub fn from_rows<B: Backend>(
    rows: &[Vec<u32>],
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let values: Vec<B::IntElem> = rows
        .iter()
        .flat_map(|row| row.iter().map(|&v| (v as i64).elem()))
        .collect();

    Tensor::from_data(Data::new(values, Shape::new([rows.len(), seq_length])), device)
}

/// Build a `[len]` integer tensor
pub fn from_values<B: Backend>(values: &[i64], device: &B::Device) -> Tensor<B, 1, Int> {
    let elems: Vec<B::IntElem> = values.iter().map(|&v| v.elem()).collect();

    Tensor::from_data(Data::new(elems, Shape::new([values.len()])), device)
}
