fn main() -> Result<(), Box<dyn std::error::Error>> {
    termpairs::app::run_create_datasets(std::env::args().skip(1))
}
