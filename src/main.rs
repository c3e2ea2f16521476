fn main() -> Result<(), Box<dyn std::error::Error>> {
    topicstream::cli::main()
}
